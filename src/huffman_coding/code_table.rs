//! Turns a Huffman tree into the per-byte code table used by the encoder and shipped in the header.

use log::trace;

use super::huffman::{HuffmanTree, Node, NodeData};
use crate::error::{Error, Result};
use crate::tools::freq_count::ByteFrequency;
use std::fmt;

/// Longest code the one byte length field in the header can describe.
pub const MAX_CODE_LEN: usize = u8::MAX as usize;

/// A huffman code: the bits on the path from the root to a leaf, left = 0, right = 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitCode(Vec<bool>);

impl BitCode {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, bit: bool) {
        self.0.push(bit);
    }

    pub fn pop(&mut self) -> Option<bool> {
        self.0.pop()
    }

    /// The bits, first (root side) bit first.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    /// True if self is a prefix of other (or equal to it).
    pub fn is_prefix_of(&self, other: &BitCode) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl From<Vec<bool>> for BitCode {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

impl fmt::Display for BitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0
            .iter()
            .try_for_each(|&bit| f.write_str(if bit { "1" } else { "0" }))
    }
}

/// Maps each byte value that occurs in the input to its code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<BitCode>>,
}

impl CodeTable {
    /// An empty table (no symbols).
    pub fn new() -> Self {
        Self {
            codes: vec![None; 256],
        }
    }

    /// Walk the tree depth first and record the path to every leaf.
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        let mut table = Self::new();
        match tree.root.node_data {
            // A single symbol still needs one bit per occurrence so the body can be walked.
            NodeData::Leaf(byte) => table.insert(byte, BitCode::from(vec![false]))?,
            NodeData::Kids(..) => {
                let mut path = BitCode::new();
                table.collect(&tree.root, &mut path)?;
            }
        }
        Ok(table)
    }

    /// Build the tree for freqs and derive its codes. The tree is dropped before returning.
    /// An empty frequency table gives an empty code table.
    pub fn from_frequencies(freqs: &ByteFrequency) -> Result<Self> {
        if freqs.is_empty() {
            return Ok(Self::new());
        }
        let tree = HuffmanTree::from_frequencies(freqs)?;
        Self::from_tree(&tree)
    }

    /// Recursively record the codes below node. path holds the bits from the root to node and
    /// is restored before returning.
    fn collect(&mut self, node: &Node, path: &mut BitCode) -> Result<()> {
        match &node.node_data {
            NodeData::Kids(left, right) => {
                path.push(false);
                self.collect(left, path)?;
                path.pop();
                path.push(true);
                self.collect(right, path)?;
                path.pop();
                Ok(())
            }
            NodeData::Leaf(byte) => self.insert(*byte, path.clone()),
        }
    }

    /// Record the code for a symbol. Codes must be 1..=255 bits long.
    pub fn insert(&mut self, symbol: u8, code: BitCode) -> Result<()> {
        if code.is_empty() || code.len() > MAX_CODE_LEN {
            return Err(Error::UnsupportedCodeLength {
                symbol,
                length: code.len(),
            });
        }
        trace!("symbol 0x{:02x} -> {}", symbol, code);
        self.codes[symbol as usize] = Some(code);
        Ok(())
    }

    pub fn get(&self, symbol: u8) -> Option<&BitCode> {
        self.codes[symbol as usize].as_ref()
    }

    /// Like get, but a missing code is an error.
    pub fn code(&self, symbol: u8) -> Result<&BitCode> {
        self.get(symbol).ok_or(Error::UnknownSymbol(symbol))
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.codes[symbol as usize].is_some()
    }

    /// (symbol, code) pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitCode)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_ref().map(|code| (symbol as u8, code)))
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the longest code, 0 for an empty table.
    pub fn max_len(&self) -> usize {
        self.iter().map(|(_, code)| code.len()).max().unwrap_or(0)
    }

    /// Size of the encoded body in bits for data with the given frequencies.
    pub fn encoded_bits(&self, freqs: &ByteFrequency) -> u64 {
        freqs
            .iter()
            .map(|(byte, count)| count * self.get(byte).map_or(0, |code| code.len() as u64))
            .sum()
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::new()
    }
}
