use crate::error::{DecodeError, Result};
use crate::tree::{MsgTree, Node};
use rayon::prelude::*;

/// Bit codes of every leaf in a tree, kept in left-first traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeTable {
    entries: Vec<(char, String)>,
}

impl CodeTable {
    /// Walks the tree depth first, appending `0` for every left turn and `1`
    /// for every right turn. A single-leaf tree maps its symbol to the empty
    /// code.
    pub fn derive(tree: &MsgTree) -> Self {
        let mut entries = Vec::new();
        let mut stack = vec![(tree.root(), String::new())];

        while let Some((node, path)) = stack.pop() {
            match node {
                Node::Leaf(payload) => entries.push((*payload, path)),
                Node::Internal { left, right } => {
                    // Right goes first so that the left subtree is reported first.
                    stack.push((&**right, format!("{path}1")));
                    stack.push((&**left, path + "0"));
                }
            }
        }

        CodeTable { entries }
    }

    /// Code of the first leaf carrying `symbol`.
    ///
    /// # Returns
    ///
    /// `None` when no leaf carries `symbol`; the empty code for the sole
    /// symbol of a single-leaf tree.
    pub fn code_of(&self, symbol: char) -> Option<&str> {
        self.entries
            .iter()
            .find(|(payload, _)| *payload == symbol)
            .map(|(_, code)| code.as_str())
    }

    /// Iterates `(symbol, code)` pairs in left-first tree order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.entries
            .iter()
            .map(|(payload, code)| (*payload, code.as_str()))
    }

    /// Number of leaves, one entry each.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when no code is a prefix of another code.
    pub fn is_prefix_free(&self) -> bool {
        let mut codes: Vec<&str> = self.entries.iter().map(|(_, code)| code.as_str()).collect();
        codes.sort_unstable();
        // After sorting, a prefix always sorts directly before some code it prefixes.
        codes.windows(2).all(|pair| !pair[1].starts_with(pair[0]))
    }
}

impl IntoIterator for CodeTable {
    type Item = (char, String);
    type IntoIter = std::vec::IntoIter<(char, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// What decoding does when the tree is a single leaf and there is no
/// internal node to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegenerateTreePolicy {
    /// The tree is treated as instantly terminal: bits are checked for
    /// validity but never walked, and the output is always empty.
    #[default]
    Terminal,
    /// Every bit emits the sole payload once.
    RepeatPerBit,
    /// A non-empty bit string fails with [`DecodeError::DegenerateTree`].
    Reject,
}

/// A decoder turning a string of `'0'`/`'1'` characters into symbols.
pub trait Decoder {
    /// Decodes a single bit string.
    ///
    /// # Errors
    ///
    /// [`DecodeError::MalformedBits`] for a character outside `{0,1}`,
    /// [`DecodeError::TruncatedInput`] when the bits end mid-symbol.
    fn decode(&self, bits: &str) -> Result<String>;

    /// Decodes independent bit strings in parallel.
    ///
    /// Results are returned in the order of `messages`; each message fails
    /// or succeeds on its own.
    fn decode_all(&self, messages: &[&str]) -> Vec<Result<String>>
    where
        Self: Sync,
    {
        messages
            .par_iter()
            .map(|bits| self.decode(bits))
            .collect()
    }
}

/// Decodes bit strings by repeated root-to-leaf descents of a [`MsgTree`].
///
/// The tree is only borrowed; every call keeps its own position and output,
/// so one decoder can serve any number of calls, including concurrent ones.
#[derive(Debug, Clone, Copy)]
pub struct TreeDecoder<'t> {
    tree: &'t MsgTree,
    policy: DegenerateTreePolicy,
}

impl<'t> TreeDecoder<'t> {
    /// Creates a decoder over `tree` with [`DegenerateTreePolicy::Terminal`].
    pub fn new(tree: &'t MsgTree) -> Self {
        Self::with_policy(tree, DegenerateTreePolicy::default())
    }

    /// Creates a decoder over `tree`.
    ///
    /// # Arguments
    ///
    /// * `tree` - The tree to walk; it is only read.
    /// * `policy` - What to do when `tree` is a single leaf.
    pub fn with_policy(tree: &'t MsgTree, policy: DegenerateTreePolicy) -> Self {
        TreeDecoder { tree, policy }
    }

    fn decode_single_leaf(&self, payload: char, bits: &str) -> Result<String> {
        let bit_count = check_bits(bits)?;
        log::warn!(
            "Tree is a single leaf {payload:?}; applying {:?} to {bit_count} bits",
            self.policy
        );

        match self.policy {
            DegenerateTreePolicy::Terminal => Ok(String::new()),
            DegenerateTreePolicy::RepeatPerBit => Ok(std::iter::repeat(payload).take(bit_count).collect()),
            DegenerateTreePolicy::Reject if bit_count == 0 => Ok(String::new()),
            DegenerateTreePolicy::Reject => Err(DecodeError::DegenerateTree { bits: bit_count }),
        }
    }
}

impl Decoder for TreeDecoder<'_> {
    fn decode(&self, bits: &str) -> Result<String> {
        let root = self.tree.root();
        let root_children = match root {
            Node::Leaf(payload) => return self.decode_single_leaf(*payload, bits),
            Node::Internal { left, right } => (&**left, &**right),
        };

        let mut output = String::new();
        let (mut left, mut right) = root_children;
        let mut at_root = true;
        let mut consumed = 0;

        for (position, symbol) in bits.chars().enumerate() {
            let bit = parse_bit(position, symbol)?;
            consumed += 1;

            let next = if bit { right } else { left };
            match next {
                Node::Leaf(payload) => {
                    log::trace!("Emitting {payload:?} after bit {position}");
                    output.push(*payload);
                    (left, right) = root_children;
                    at_root = true;
                }
                Node::Internal {
                    left: next_left,
                    right: next_right,
                } => {
                    (left, right) = (&**next_left, &**next_right);
                    at_root = false;
                }
            }
        }

        if !at_root {
            return Err(DecodeError::TruncatedInput { consumed });
        }

        log::debug!(
            "Decoded {consumed} bits into {} characters",
            output.chars().count()
        );
        Ok(output)
    }
}

/// Decodes `bits` against `tree` with the default [`DegenerateTreePolicy`].
///
/// # Errors
///
/// See [`Decoder::decode`].
pub fn decode(tree: &MsgTree, bits: &str) -> Result<String> {
    TreeDecoder::new(tree).decode(bits)
}

fn parse_bit(position: usize, symbol: char) -> Result<bool> {
    match symbol {
        '0' => Ok(false),
        '1' => Ok(true),
        found => Err(DecodeError::MalformedBits { position, found }),
    }
}

/// Validates every character and returns the bit count.
fn check_bits(bits: &str) -> Result<usize> {
    bits.chars()
        .enumerate()
        .try_fold(0, |count, (position, symbol)| {
            parse_bit(position, symbol).map(|_| count + 1)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_leaf_tree() -> MsgTree {
        MsgTree::build("^a^bc").unwrap()
    }

    #[test]
    fn derive_should_list_codes_left_first() {
        let codes = three_leaf_tree().codes();

        let listed: Vec<(char, &str)> = codes.iter().collect();
        assert_eq!(listed, vec![('a', "0"), ('b', "10"), ('c', "11")]);
    }

    #[test]
    fn derive_should_give_single_leaf_empty_code() {
        let codes = MsgTree::build("x").unwrap().codes();

        assert_eq!(codes.len(), 1);
        assert_eq!(codes.code_of('x'), Some(""));
    }

    #[test]
    fn derive_should_produce_prefix_free_codes() {
        let codes = MsgTree::build("^^ab^c^de").unwrap().codes();

        assert!(codes.is_prefix_free());
        assert_eq!(codes.code_of('e'), Some("111"));
    }

    #[test]
    fn is_prefix_free_should_detect_prefix() {
        let table = CodeTable {
            entries: vec![('a', "0".to_string()), ('b', "01".to_string())],
        };

        assert!(!table.is_prefix_free());
    }

    #[test]
    fn decode_should_invert_encoding() {
        let tree = three_leaf_tree();

        assert_eq!(decode(&tree, "01011"), Ok("abc".to_string()));
        assert_eq!(decode(&tree, "111000"), Ok("cbaa".to_string()));
    }

    #[test]
    fn decode_should_accept_empty_bits() {
        assert_eq!(decode(&three_leaf_tree(), ""), Ok(String::new()));
    }

    #[test]
    fn decode_should_emit_leaf_on_right_turn() {
        let tree = MsgTree::build("^ab").unwrap();

        assert_eq!(decode(&tree, "1"), Ok("b".to_string()));
    }

    #[test]
    fn decode_should_fail_on_truncated_bits() {
        let tree = three_leaf_tree();

        assert_eq!(
            decode(&tree, "1"),
            Err(DecodeError::TruncatedInput { consumed: 1 })
        );
        assert_eq!(
            decode(&tree, "0101"),
            Err(DecodeError::TruncatedInput { consumed: 4 })
        );
    }

    #[test]
    fn decode_should_fail_on_invalid_character() {
        assert_eq!(
            decode(&three_leaf_tree(), "01 011"),
            Err(DecodeError::MalformedBits {
                position: 2,
                found: ' '
            })
        );
    }

    #[test]
    fn decode_should_not_share_state_between_calls() {
        let tree = three_leaf_tree();
        let decoder = TreeDecoder::new(&tree);

        assert!(decoder.decode("1").is_err());
        assert_eq!(decoder.decode("10"), Ok("b".to_string()));
        assert_eq!(decoder.decode("10"), Ok("b".to_string()));
    }

    #[test]
    fn single_leaf_should_be_terminal_by_default() {
        let tree = MsgTree::build("x").unwrap();

        assert_eq!(decode(&tree, ""), Ok(String::new()));
        assert_eq!(decode(&tree, "0101"), Ok(String::new()));
        assert_eq!(
            decode(&tree, "01a"),
            Err(DecodeError::MalformedBits {
                position: 2,
                found: 'a'
            })
        );
    }

    #[test]
    fn single_leaf_should_repeat_per_bit_when_asked() {
        let tree = MsgTree::build("x").unwrap();
        let decoder = TreeDecoder::with_policy(&tree, DegenerateTreePolicy::RepeatPerBit);

        assert_eq!(decoder.decode("000"), Ok("xxx".to_string()));
        assert_eq!(decoder.decode(""), Ok(String::new()));
    }

    #[test]
    fn single_leaf_should_reject_bits_when_asked() {
        let tree = MsgTree::build("x").unwrap();
        let decoder = TreeDecoder::with_policy(&tree, DegenerateTreePolicy::Reject);

        assert_eq!(
            decoder.decode("01"),
            Err(DecodeError::DegenerateTree { bits: 2 })
        );
        assert_eq!(decoder.decode(""), Ok(String::new()));
    }

    #[test]
    fn decode_all_should_keep_input_order() {
        let tree = three_leaf_tree();
        let decoder = TreeDecoder::new(&tree);

        let results = decoder.decode_all(&["0", "10", "1", "11", "2"]);

        assert_eq!(results.len(), 5);
        assert_eq!(results[0], Ok("a".to_string()));
        assert_eq!(results[1], Ok("b".to_string()));
        assert_eq!(results[2], Err(DecodeError::TruncatedInput { consumed: 1 }));
        assert_eq!(results[3], Ok("c".to_string()));
        assert!(matches!(results[4], Err(DecodeError::MalformedBits { .. })));
    }
}
