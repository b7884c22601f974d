//! Byte oriented Huffman compression, with run length encoding as a second codec.
//!
//! Version 0.1.0
//!
//! The Huffman codec counts every byte value in the input, builds a tree by repeatedly merging the
//! two lightest nodes, and writes a self describing container:
//!
//! `[u32 original length][u16 header length][(symbol, bit length, code bytes)...][packed codes]`
//!
//! All integers are big endian and codes are packed most significant bit first. The container
//! carries everything needed to decode it; no shared state between the two sides.
//!
//! Basic usage from the command line:
//!
//! `$> huffle notes.txt`
//!
//! This will compress the file and create notes.txt.huf. The original file will be deleted.
//! `huffle -d notes.txt.huf` restores it, and `--rle` switches both directions to run length
//! pairs.
//!
//! As a library:
//!
//! ```
//! let container = huffle::encode(b"AAABBCCCC").unwrap();
//! assert_eq!(huffle::decode(container.as_bytes()).unwrap(), b"AAABBCCCC");
//! ```
//!
//Enable more cargo lint tests
#![warn(rust_2018_idioms)]

pub mod bitstream;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use compression::compress::{encode, encode_stream};
pub use compression::container::{CompressedContainer, ContainerInfo};
pub use compression::decompress::{decode, decode_stream};
pub use error::{Error, Result};
pub use tools::rle::{rle_decode, rle_decode_stream, rle_encode, rle_encode_stream};
