use crate::codec::CodeTable;
use crate::error::{DecodeError, Result, TreeFault};
use std::fmt;
use std::mem;
use std::str::FromStr;

/// Reserved character marking an internal node in a preorder serialization.
pub const INTERNAL_MARKER: char = '^';

/// A node of a prefix-code tree.
///
/// A node has either no children (a leaf carrying a payload) or exactly two,
/// so every internal node can always be descended in both directions.
///
/// `Clone`, `PartialEq`, `Debug` and `Drop` walk the tree with an explicit
/// stack, so none of them recurse once per level on a deep tree.
pub enum Node {
    Leaf(char),
    Internal { left: Box<Node>, right: Box<Node> },
}

impl Node {
    /// Joins two subtrees under a new internal node.
    pub fn internal(left: Node, right: Node) -> Self {
        Node::Internal {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns the payload of a leaf, `None` for an internal node.
    pub fn payload(&self) -> Option<char> {
        match self {
            Node::Leaf(payload) => Some(*payload),
            Node::Internal { .. } => None,
        }
    }

    /// Returns the `(left, right)` children of an internal node, `None` for a leaf.
    pub fn children(&self) -> Option<(&Node, &Node)> {
        match self {
            Node::Leaf(_) => None,
            Node::Internal { left, right } => Some((&**left, &**right)),
        }
    }

    /// Number of nodes in this subtree, itself included.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            if let Some((left, right)) = node.children() {
                stack.push(right);
                stack.push(left);
            }
        }
        count
    }

    /// Longest root-to-leaf path counted in edges.
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some((left, right)) = node.children() {
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }
        deepest
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node.children() {
                Some((left, right)) => {
                    stack.push(right);
                    stack.push(left);
                }
                None => count += 1,
            }
        }
        count
    }

    /// Compares the leaf/internal layout of two trees, ignoring payloads.
    pub fn same_shape(&self, other: &Node) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            match (a.children(), b.children()) {
                (None, None) => {}
                (Some((a_left, a_right)), Some((b_left, b_right))) => {
                    stack.push((a_right, b_right));
                    stack.push((a_left, b_left));
                }
                _ => return false,
            }
        }
        true
    }

    /// Preorder serialization: `^` for every internal node, the payload for every leaf.
    pub fn preorder(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf(payload) => out.push(*payload),
                Node::Internal { left, right } => {
                    out.push(INTERNAL_MARKER);
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        out
    }
}

/// Number of nodes in a possibly absent subtree.
pub fn size(node: Option<&Node>) -> usize {
    node.map_or(0, Node::size)
}

/// Height of a possibly absent subtree: `-1` when absent, `0` for a single leaf.
pub fn height(node: Option<&Node>) -> isize {
    node.map_or(-1, |node| node.height() as isize)
}

/// Assembles a tree from nodes fed in preorder.
#[derive(Default)]
struct Assembler {
    // Internal nodes still open; `Some` once the left subtree is finished.
    pending: Vec<Option<Node>>,
}

impl Assembler {
    fn open_internal(&mut self) {
        self.pending.push(None);
    }

    /// Attaches a leaf and closes every internal node it completes.
    ///
    /// # Returns
    ///
    /// The root once the whole tree is complete, `None` while nodes are
    /// still waiting for children.
    fn push_leaf(&mut self, payload: char) -> Option<Node> {
        let mut completed = Node::Leaf(payload);
        loop {
            match self.pending.pop() {
                None => return Some(completed),
                Some(None) => {
                    self.pending.push(Some(completed));
                    return None;
                }
                Some(Some(left)) => completed = Node::internal(left, completed),
            }
        }
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        let mut assembler = Assembler::default();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf(payload) => {
                    if let Some(root) = assembler.push_leaf(*payload) {
                        return root;
                    }
                }
                Node::Internal { left, right } => {
                    assembler.open_internal();
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        // Every internal node has two children, so the last leaf closes the root.
        unreachable!("preorder walk ended before the root was complete")
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            match (a, b) {
                (Node::Leaf(x), Node::Leaf(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (
                    Node::Internal {
                        left: a_left,
                        right: a_right,
                    },
                    Node::Internal {
                        left: b_left,
                        right: b_right,
                    },
                ) => {
                    stack.push((&**a_right, &**b_right));
                    stack.push((&**a_left, &**b_left));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.preorder()).finish()
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let Node::Internal { left, right } = self else {
            return;
        };
        if left.is_leaf() && right.is_leaf() {
            return;
        }

        // Detach subtrees onto a local stack so that each node is dropped
        // with leaf children only.
        let mut stack = vec![
            mem::replace(&mut **left, Node::Leaf('\0')),
            mem::replace(&mut **right, Node::Leaf('\0')),
        ];
        while let Some(mut node) = stack.pop() {
            if let Node::Internal { left, right } = &mut node {
                stack.push(mem::replace(&mut **left, Node::Leaf('\0')));
                stack.push(mem::replace(&mut **right, Node::Leaf('\0')));
            }
        }
    }
}

/// A prefix-code tree rebuilt from its preorder serialization.
///
/// The tree is immutable once built, so any number of decoders may read it
/// at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgTree {
    root: Node,
}

impl MsgTree {
    /// Rebuilds a tree from a preorder serialization.
    ///
    /// The serialization is consumed exactly once, left to right. `^` opens an
    /// internal node whose left and then right subtrees follow; any other
    /// character is a leaf. The cursor lives on this call's stack, and the
    /// nodes still waiting for children are kept on an explicit stack, so
    /// deeply unbalanced trees do not recurse.
    ///
    /// # Errors
    ///
    /// [`DecodeError::MalformedTree`] when the serialization is empty, ends
    /// while a node is still expected, or has characters left after the root
    /// is complete.
    pub fn build(serialization: &str) -> Result<Self> {
        let mut chars = serialization.chars();
        let mut position = 0;
        let mut assembler = Assembler::default();

        let root = loop {
            let Some(symbol) = chars.next() else {
                let fault = if position == 0 {
                    TreeFault::Empty
                } else {
                    TreeFault::UnexpectedEnd
                };
                return Err(DecodeError::MalformedTree { position, fault });
            };
            position += 1;

            if symbol == INTERNAL_MARKER {
                assembler.open_internal();
            } else if let Some(root) = assembler.push_leaf(symbol) {
                break root;
            }
        };

        if chars.next().is_some() {
            return Err(DecodeError::MalformedTree {
                position,
                fault: TreeFault::TrailingInput,
            });
        }

        log::debug!(
            "Rebuilt tree from {position} characters: {} nodes, {} leaves",
            root.size(),
            root.leaf_count()
        );
        Ok(MsgTree { root })
    }

    /// Root node; a leaf when the tree holds a single symbol.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// `true` when the root itself is a leaf.
    pub fn is_single_leaf(&self) -> bool {
        self.root.is_leaf()
    }

    /// Number of nodes, internal ones included.
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Height in edges; a single-leaf tree has height 0.
    pub fn height(&self) -> isize {
        height(Some(&self.root))
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Preorder serialization of the tree; [`MsgTree::build`] on the result
    /// gives back an equal tree.
    pub fn preorder(&self) -> String {
        self.root.preorder()
    }

    pub fn same_shape(&self, other: &MsgTree) -> bool {
        self.root.same_shape(&other.root)
    }

    /// Bit codes of every leaf, in left-first order.
    pub fn codes(&self) -> CodeTable {
        CodeTable::derive(self)
    }
}

impl FromStr for MsgTree {
    type Err = DecodeError;

    fn from_str(serialization: &str) -> Result<Self> {
        MsgTree::build(serialization)
    }
}

impl fmt::Display for MsgTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(&self.root, 0usize, "root")];
        while let Some((node, depth, label)) = stack.pop() {
            let indent = "  ".repeat(depth);
            match node {
                Node::Leaf(payload) => writeln!(f, "{indent}{label}-> Leaf: {payload:?}")?,
                Node::Internal { left, right } => {
                    writeln!(f, "{indent}{label}-> Internal")?;
                    stack.push((&**right, depth + 1, "R"));
                    stack.push((&**left, depth + 1, "L"));
                }
            }
        }
        Ok(())
    }
}
