use thiserror::Error;

/// Error types produced while rebuilding a tree or decoding a bit string.
///
/// None of these are recoverable by retrying: they all mean the input is
/// corrupt or not in the expected format.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DecodeError {
    #[error("Malformed tree serialization at position {position}: {fault}")]
    MalformedTree {
        /// Character offset in the serialization where the fault was detected.
        position: usize,
        /// What went wrong.
        fault: TreeFault,
    },

    #[error("Malformed bit string: unexpected {found:?} at position {position}")]
    MalformedBits {
        /// Character offset in the bit string.
        position: usize,
        /// The offending character.
        found: char,
    },

    #[error("Truncated bit string: input ended mid-symbol after {consumed} bits")]
    TruncatedInput {
        /// Number of bits consumed before the input ran out.
        consumed: usize,
    },

    #[error("Refusing to walk {bits} bits against a single-leaf tree")]
    DegenerateTree { bits: usize },
}

/// Structural faults in a preorder serialization.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TreeFault {
    #[error("serialization is empty")]
    Empty,

    #[error("input ended while a node was still expected")]
    UnexpectedEnd,

    #[error("trailing characters after the root was complete")]
    TrailingInput,
}

/// Errors related to the `.arch` text format and file access.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive is empty")]
    Empty,

    #[error("Archive has no bit string line")]
    MissingBits,

    #[error("Not an archive file: {0} (expected a .arch extension)")]
    Extension(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Result of rebuilding or decoding.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Result of reading or decoding an archive.
pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;
