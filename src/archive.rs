use crate::codec::{CodeTable, Decoder, DegenerateTreePolicy, TreeDecoder};
use crate::error::{ArchiveError, ArchiveResult};
use crate::stats::Statistics;
use crate::tree::MsgTree;
use std::fs;
use std::path::Path;

/// File extension of archive files.
pub const ARCHIVE_EXTENSION: &str = "arch";

/// The two parts of an archive: a preorder tree serialization and the bit
/// string encoded with that tree.
///
/// # Format
///
/// ```text
/// <serialization line>
/// [<second serialization line>]
/// <bit string line>
/// ```
///
/// When the tree has a newline leaf, the serialization itself spans two lines
/// and the newline between them belongs to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub serialization: String,
    pub bits: String,
}

/// Everything recovered from an archive.
#[derive(Debug, Clone)]
pub struct Report {
    pub tree: MsgTree,
    pub codes: CodeTable,
    pub message: String,
    pub statistics: Statistics,
}

impl Archive {
    /// Splits archive text into its serialization and bit string.
    ///
    /// With fewer than three lines the first line is the serialization; with
    /// three or more, the first two lines joined by `\n` are. The bit string
    /// is the line right after the serialization, and later lines are ignored.
    ///
    /// # Arguments
    ///
    /// * `text` - Contents of an archive file; `\r\n` line endings are accepted.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::Empty`] for empty text, [`ArchiveError::MissingBits`]
    /// when there is no bit string line.
    pub fn parse(text: &str) -> ArchiveResult<Self> {
        let lines: Vec<&str> = text.lines().collect();

        let (serialization, bits) = match lines.as_slice() {
            [] => return Err(ArchiveError::Empty),
            [_] => return Err(ArchiveError::MissingBits),
            [serialization, bits] => (serialization.to_string(), *bits),
            [first, second, bits, rest @ ..] => {
                if !rest.is_empty() {
                    log::warn!("Ignoring {} lines after the bit string", rest.len());
                }
                (format!("{first}\n{second}"), *bits)
            }
        };

        Ok(Archive {
            serialization,
            bits: bits.to_string(),
        })
    }

    /// Reads and parses an archive file.
    ///
    /// # Arguments
    ///
    /// * `path` - Archive location; it must carry the `.arch` extension.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::Extension`] for any other extension,
    /// [`ArchiveError::Io`] when the file cannot be read, and the errors of
    /// [`Archive::parse`].
    pub fn open(path: &Path) -> ArchiveResult<Self> {
        if path.extension().and_then(|ext| ext.to_str()) != Some(ARCHIVE_EXTENSION) {
            return Err(ArchiveError::Extension(path.display().to_string()));
        }

        let text = fs::read_to_string(path)?;
        log::info!("Read {} bytes from {}", text.len(), path.display());
        Self::parse(&text)
    }

    /// Rebuilds the tree, derives its codes, decodes the bit string and
    /// measures the result.
    ///
    /// # Arguments
    ///
    /// * `policy` - How a single-leaf tree decodes its bits.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::Decode`] wrapping the [`DecodeError`](crate::DecodeError)
    /// from building the tree or decoding the bits.
    pub fn decode(&self, policy: DegenerateTreePolicy) -> ArchiveResult<Report> {
        let tree = MsgTree::build(&self.serialization)?;
        let codes = tree.codes();
        let message = TreeDecoder::with_policy(&tree, policy).decode(&self.bits)?;
        let statistics = Statistics::compute(self.bits.chars().count(), &message);

        Ok(Report {
            tree,
            codes,
            message,
            statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, TreeFault};

    #[test]
    fn parse_should_split_two_line_archive() {
        let archive = Archive::parse("^a^bc\n01011\n").unwrap();

        assert_eq!(archive.serialization, "^a^bc");
        assert_eq!(archive.bits, "01011");
    }

    #[test]
    fn parse_should_join_serialization_spanning_two_lines() {
        let archive = Archive::parse("^a^\nb\n01011").unwrap();

        assert_eq!(archive.serialization, "^a^\nb");
        assert_eq!(archive.bits, "01011");
    }

    #[test]
    fn parse_should_ignore_lines_after_bits() {
        let archive = Archive::parse("^a^\nb\n0100\n1111\nnotes\n").unwrap();

        assert_eq!(archive.serialization, "^a^\nb");
        assert_eq!(archive.bits, "0100");
    }

    #[test]
    fn decode_should_reject_bits_folded_into_serialization() {
        // A trailing blank line makes three lines, so "01" joins the serialization.
        let archive = Archive::parse("^ab\n01\n\n").unwrap();
        assert_eq!(archive.serialization, "^ab\n01");
        assert_eq!(archive.bits, "");

        let result = archive.decode(DegenerateTreePolicy::default());

        assert!(matches!(
            result,
            Err(ArchiveError::Decode(DecodeError::MalformedTree {
                position: 3,
                fault: TreeFault::TrailingInput
            }))
        ));
    }

    #[test]
    fn parse_should_strip_carriage_returns() {
        let archive = Archive::parse("^ab\r\n01\r\n").unwrap();

        assert_eq!(archive.serialization, "^ab");
        assert_eq!(archive.bits, "01");
    }

    #[test]
    fn parse_should_reject_missing_bits() {
        assert!(matches!(Archive::parse("^ab"), Err(ArchiveError::MissingBits)));
        assert!(matches!(Archive::parse(""), Err(ArchiveError::Empty)));
    }

    #[test]
    fn open_should_reject_other_extensions() {
        let result = Archive::open(Path::new("message.txt"));

        assert!(matches!(result, Err(ArchiveError::Extension(_))));
    }

    #[test]
    fn open_should_read_archive_file() {
        let path = std::env::temp_dir().join(format!("arch_decoder_{}.arch", std::process::id()));
        fs::write(&path, "^a^\nb\n0100\n").unwrap();

        let archive = Archive::open(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let report = archive.decode(DegenerateTreePolicy::default()).unwrap();
        assert_eq!(report.message, "a\na");
    }

    #[test]
    fn decode_should_report_codes_message_and_statistics() {
        let archive = Archive::parse("^a^bc\n01011").unwrap();

        let report = archive.decode(DegenerateTreePolicy::default()).unwrap();

        assert_eq!(report.message, "abc");
        assert_eq!(report.codes.code_of('b'), Some("10"));
        assert_eq!(report.statistics.total_chars, 3);
        assert_eq!(report.statistics.bit_count, 5);
    }

    #[test]
    fn decode_should_surface_core_errors() {
        let archive = Archive::parse("^a^bc\n1").unwrap();

        let result = archive.decode(DegenerateTreePolicy::default());

        assert!(matches!(
            result,
            Err(ArchiveError::Decode(DecodeError::TruncatedInput { consumed: 1 }))
        ));
    }
}
