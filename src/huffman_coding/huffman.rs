use log::trace;

use crate::error::{Error, Result};
use crate::tools::freq_count::ByteFrequency;
use std::cmp::Ordering;
use std::fmt;

/// Sequence numbers for merged nodes start above every possible byte value.
const FIRST_MERGE: u32 = 256;

#[derive(Debug, Clone)]
pub enum NodeData {
    Kids(Box<Node>, Box<Node>),
    Leaf(u8),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub weight: u64,
    /// Tie-break for equal weights: the byte value for leaves, 256 + merge index for kids.
    pub seq: u32,
    pub node_data: NodeData,
}

impl Node {
    /// Create a new node
    pub fn new(weight: u64, seq: u32, node_data: NodeData) -> Node {
        Node {
            weight,
            seq,
            node_data,
        }
    }

    /// How many edges lie between this node and its deepest leaf.
    pub fn depth(&self) -> usize {
        match &self.node_data {
            NodeData::Kids(left, right) => 1 + left.depth().max(right.depth()),
            NodeData::Leaf(_) => 0,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}

impl Eq for Node {}

impl Ord for Node {
    /// Sort Nodes by decreasing weight and decreasing sequence, so the two nodes to merge
    /// next sit at the end of the worklist.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A Huffman code tree. Each node owns its children, so dropping the tree frees all of it.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    pub root: Node,
}

impl HuffmanTree {
    /// Build a tree by repeatedly merging the two lightest nodes. The first node taken becomes
    /// the left (0) child, the second the right (1) child.
    ///
    /// Ties are broken by sequence number: leaves before merged nodes, lower byte values
    /// before higher ones, older merges before newer ones.
    pub fn from_frequencies(freqs: &ByteFrequency) -> Result<Self> {
        // One leaf per byte that actually occurs
        let mut tree: Vec<Node> = freqs
            .iter()
            .map(|(byte, count)| Node::new(count, byte as u32, NodeData::Leaf(byte)))
            .collect();

        if tree.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut seq = FIRST_MERGE;
        // ...then pare it down to one single node with child nodes - keep it sorted.
        while tree.len() > 1 {
            // Keep the nodes sorted so the lightest two are popped off the end.
            tree.sort_unstable();

            let (Some(left_child), Some(right_child)) = (tree.pop(), tree.pop()) else {
                break;
            };
            trace!(
                "merge seq {} (w {}) + seq {} (w {}) -> seq {}",
                left_child.seq,
                left_child.weight,
                right_child.seq,
                right_child.weight,
                seq
            );
            tree.push(Node::new(
                left_child.weight + right_child.weight,
                seq,
                NodeData::Kids(Box::new(left_child), Box::new(right_child)),
            ));
            seq += 1;
        }

        match tree.pop() {
            Some(root) => Ok(HuffmanTree { root }),
            None => Err(Error::EmptyInput),
        }
    }

    /// Length of the longest code in the tree.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Number of leaves, i.e. distinct symbols.
    pub fn leaves(&self) -> usize {
        fn count(node: &Node) -> usize {
            match &node.node_data {
                NodeData::Kids(left, right) => count(left) + count(right),
                NodeData::Leaf(_) => 1,
            }
        }
        count(&self.root)
    }

    fn render(node: &Node, depth: usize, label: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match &node.node_data {
            NodeData::Kids(left, right) => {
                writeln!(f, "{}{}({})", indent, label, node.weight)?;
                Self::render(left, depth + 1, "0: ", f)?;
                Self::render(right, depth + 1, "1: ", f)
            }
            NodeData::Leaf(byte) => {
                if byte.is_ascii_graphic() {
                    writeln!(f, "{}{}'{}' 0x{:02x} ({})", indent, label, *byte as char, byte, node.weight)
                } else {
                    writeln!(f, "{}{}0x{:02x} ({})", indent, label, byte, node.weight)
                }
            }
        }
    }
}

/// Text outline of the tree, one node per line, children indented under their parent.
impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::render(&self.root, 0, "", f)
    }
}
