//! The compression module manages both directions of the huffman codec, plus the file handling
//! used by the command line tool.
//!
//! Huffman compression happens in the following steps:
//! - Frequency count: count every byte value in the whole input.
//! - Tree building: merge the lightest nodes until one root remains.
//! - Code table: record the root to leaf path of every byte.
//! - Header: serialize the code table.
//! - Body: pack the code of every input byte, in input order.
//!
//! The container is `[u32 original length][u16 header length][header entries][body]`, all big
//! endian. The stream form reads its input twice (once to count, once to encode), so it needs a
//! source that can seek back.
//!
//! Decompression follows the inverse: read the length and header, rebuild a tree from the codes,
//! and walk the body one bit at a time until the original number of bytes is restored.
//!

pub mod compress;
pub mod container;
pub mod decompress;
pub mod files;
