//! The huffman module builds the code tables used by huffle. Encoding and decoding the body
//! happens in the compression module.
//!
//! The whole input is counted once up front, so every byte value gets exactly one code for the
//! entire input. Codes come from a standard greedy Huffman tree: the two lightest nodes are merged
//! until a single root is left, and each byte's code is the path from the root to its leaf.
//!
//! The tree itself never leaves the encoder. The header carries the code table instead, and the
//! decoder rebuilds an equivalent tree from the codes alone.
//!
//! - huffman: tree construction from byte frequencies, plus a text rendering of the tree.
//! - code_table: codes derived from the tree.
//! - header: the binary form of the code table.
//! - decode_tree: the tree rebuilt from a code table, walked bit by bit while decoding.
//!

pub mod code_table;
pub mod decode_tree;
pub mod header;
pub mod huffman;
