//! Decode side tree, rebuilt from the code table carried in the header.
//!
//! Nodes live in an arena and refer to their children by index, root at index 0. Each code is
//! inserted by walking its bits from the root, creating branches as needed, and hanging a leaf
//! off the last bit.

use super::code_table::CodeTable;
use crate::error::{Error, Result};

/// Arena index of the root.
pub const ROOT: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
enum DecodeNode {
    Branch([Option<usize>; 2]),
    Leaf(u8),
}

/// Result of following one bit from a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Continue from this branch.
    Branch(usize),
    /// Reached a leaf with this symbol.
    Symbol(u8),
}

#[derive(Debug, Clone)]
pub struct DecodeTree {
    nodes: Vec<DecodeNode>,
}

impl DecodeTree {
    /// Rebuild a tree from a code table. Fails if the codes are not prefix free.
    pub fn from_code_table(table: &CodeTable) -> Result<Self> {
        let mut nodes = Vec::with_capacity(2 * table.len());
        nodes.push(DecodeNode::Branch([None, None]));

        for (symbol, code) in table.iter() {
            let mut node = ROOT;
            let last = code.len() - 1;
            for (i, bit) in code.iter().enumerate() {
                let DecodeNode::Branch(kids) = &nodes[node] else {
                    return Err(prefix_clash(symbol));
                };
                let slot = kids[bit as usize];
                node = match (slot, i == last) {
                    // Place the leaf
                    (None, true) => {
                        nodes.push(DecodeNode::Leaf(symbol));
                        let leaf = nodes.len() - 1;
                        attach(&mut nodes, node, bit, leaf);
                        break;
                    }
                    // Grow the path
                    (None, false) => {
                        nodes.push(DecodeNode::Branch([None, None]));
                        let child = nodes.len() - 1;
                        attach(&mut nodes, node, bit, child);
                        child
                    }
                    // Follow an existing branch
                    (Some(child), false) => child,
                    // Something already hangs where this leaf should go
                    (Some(_), true) => return Err(prefix_clash(symbol)),
                };
            }
        }
        Ok(Self { nodes })
    }

    /// Follow bit from the branch at node. None if the tree has nothing there.
    pub fn step(&self, node: usize, bit: bool) -> Option<Step> {
        let DecodeNode::Branch(kids) = self.nodes.get(node)? else {
            return None;
        };
        let child = kids[bit as usize]?;
        match self.nodes[child] {
            DecodeNode::Branch(_) => Some(Step::Branch(child)),
            DecodeNode::Leaf(symbol) => Some(Step::Symbol(symbol)),
        }
    }

    /// Number of nodes in the arena, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}

fn attach(nodes: &mut [DecodeNode], parent: usize, bit: bool, child: usize) {
    if let DecodeNode::Branch(kids) = &mut nodes[parent] {
        kids[bit as usize] = Some(child);
    }
}

fn prefix_clash(symbol: u8) -> Error {
    Error::MalformedHeader(format!(
        "code for symbol 0x{:02x} clashes with another code",
        symbol
    ))
}
