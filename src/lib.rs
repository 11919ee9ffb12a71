//! Decoder for messages archived with a prefix-code binary tree.
//!
//! An archive carries the tree as a preorder serialization (`^` for an
//! internal node, any other character for a leaf) followed by the message as a
//! string of `0`/`1` bits. Decoding walks from the root, left on `0` and right
//! on `1`, emitting a leaf's payload and restarting at the root each time a
//! leaf is reached.
//!
//! ```
//! use arch_decoder::{decode, MsgTree};
//!
//! let tree = MsgTree::build("^a^bc").unwrap();
//! let table = tree.codes();
//! let codes: Vec<(char, &str)> = table.iter().collect();
//! assert_eq!(codes, vec![('a', "0"), ('b', "10"), ('c', "11")]);
//! assert_eq!(decode(&tree, "01011").unwrap(), "abc");
//! ```

pub mod archive;
pub mod codec;
pub mod error;
pub mod stats;
pub mod tree;

pub use archive::{Archive, Report};
pub use codec::{decode, CodeTable, Decoder, DegenerateTreePolicy, TreeDecoder};
pub use error::{ArchiveError, ArchiveResult, DecodeError, TreeFault};
pub use stats::Statistics;
pub use tree::{MsgTree, Node};
