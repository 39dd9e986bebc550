//! Format sniffing: heuristic discovery of encoding, delimiter, and
//! qualifier from a file's header line.
//!
//! Sniffing is a best-effort guess surfaced to the caller for confirmation;
//! the engine tolerates being handed a different configuration afterward.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{FileConfig, TextEncoding};
use crate::error::{RecordmendError, Result};
use crate::input::{read_file, split_lines};
use crate::progress::ProgressSink;

/// Runs of word characters; what remains between them in the header line
/// are the spacer candidates.
static WORD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("static pattern"));

/// A proposed configuration fragment sniffed from a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SniffOutcome {
    /// The file the proposal was derived from.
    pub path: PathBuf,
    /// Proposed field delimiter.
    pub delimiter: char,
    /// Proposed qualifier, if exactly one candidate character was found.
    pub qualifier: Option<char>,
    /// Encoding the file decoded under.
    pub encoding: TextEncoding,
}

impl SniffOutcome {
    /// Seed a full [`FileConfig`] from this proposal plus a user-supplied
    /// record-start pattern.
    pub fn to_config(&self, record_start_pattern: &str) -> Result<FileConfig> {
        let qualifier = self.qualifier.map(String::from).unwrap_or_default();
        FileConfig::build(
            record_start_pattern,
            &self.delimiter.to_string(),
            &qualifier,
            self.encoding,
        )
    }
}

/// Guess encoding, delimiter, and qualifier for a delimited text file.
///
/// Emits coarse progress labels through `progress` as it works. Returns a
/// typed failure when the file is binary, undecodable under both candidate
/// encodings, or yields no delimiter candidate.
pub fn sniff(path: impl AsRef<Path>, progress: &dyn ProgressSink) -> Result<SniffOutcome> {
    let path = path.as_ref();

    progress.emit("Collecting byte header");
    let bytes = read_file(path)?;
    let raw_lines = split_lines(&bytes);
    let Some(raw_header) = raw_lines.first() else {
        return Err(RecordmendError::EmptyData(
            "file has no header line".to_string(),
        ));
    };

    progress.emit("Checking for binary content");
    if raw_header.contains(&0) {
        return Err(RecordmendError::NotTextEncoding {
            path: path.to_path_buf(),
        });
    }

    progress.emit("Reading lines to confirm UTF-8 encoding");
    let (header, encoding) = match decode_all(&raw_lines, TextEncoding::Utf8) {
        (Some(header), bad) if bad.is_empty() => (header, TextEncoding::Utf8),
        _ => {
            progress.emit("UTF-8 failed, trying Windows-1252");
            let (header, bad) = decode_all(&raw_lines, TextEncoding::Windows1252);
            if !bad.is_empty() {
                return Err(RecordmendError::UndecodableBytes {
                    path: path.to_path_buf(),
                    lines: bad,
                });
            }
            (
                header.expect("header decodes when no line failed"),
                TextEncoding::Windows1252,
            )
        }
    };

    progress.emit("Finding delimiter and qualifier");
    let spacer = match choose_spacer(&header) {
        Some(spacer) => spacer,
        None => return Err(RecordmendError::DelimiterNotFound),
    };
    let delimiter = find_unique_char(&spacer).ok_or(RecordmendError::DelimiterNotFound)?;
    let qualifier = find_qualifier(&spacer, delimiter);

    Ok(SniffOutcome {
        path: path.to_path_buf(),
        delimiter,
        qualifier,
        encoding,
    })
}

/// Decode every line under one encoding. Returns the decoded header (when
/// it decoded) and the lossy renderings of every line that did not.
fn decode_all(raw_lines: &[&[u8]], encoding: TextEncoding) -> (Option<String>, Vec<String>) {
    let mut header = None;
    let mut bad = Vec::new();
    for (i, raw) in raw_lines.iter().enumerate() {
        match encoding.decode_line(raw) {
            Some(line) => {
                if i == 0 {
                    header = Some(line);
                }
            }
            None => bad.push(String::from_utf8_lossy(raw).into_owned()),
        }
    }
    (header, bad)
}

/// Split the header on word-character runs and keep the space-stripped,
/// non-empty punctuation runs between field names. The second spacer is
/// preferred when more than one exists; the first column often carries a
/// leading index or id marker whose spacer is not representative.
fn choose_spacer(header: &str) -> Option<String> {
    let spacers: Vec<String> = WORD_RUN
        .split(header)
        .map(|s| s.replace(' ', ""))
        .filter(|s| !s.is_empty())
        .collect();
    match spacers.len() {
        0 => None,
        1 => Some(spacers[0].clone()),
        _ => Some(spacers[1].clone()),
    }
}

/// The delimiter candidate is a character occurring exactly once in the
/// spacer. Returns `None` when every character repeats.
fn find_unique_char(spacer: &str) -> Option<char> {
    let chars: Vec<char> = spacer.chars().collect();
    chars
        .iter()
        .copied()
        .find(|&c| chars.iter().filter(|&&x| x == c).count() == 1)
}

/// After removing the delimiter from the spacer, a single distinct leftover
/// character is taken as the qualifier.
fn find_qualifier(spacer: &str, delimiter: char) -> Option<char> {
    let mut leftover: Vec<char> = spacer.chars().filter(|&c| c != delimiter).collect();
    leftover.sort_unstable();
    leftover.dedup();
    match leftover.as_slice() {
        [q] => Some(*q),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_sniff_csv_with_qualifier() {
        let file = write_temp(b"id,\"name\",\"notes\"\n1,\"Alice\",\"hi\"\n");
        let outcome = sniff(file.path(), &NullProgress).unwrap();
        assert_eq!(outcome.delimiter, ',');
        assert_eq!(outcome.qualifier, Some('"'));
        assert_eq!(outcome.encoding, TextEncoding::Utf8);
    }

    #[test]
    fn test_sniff_plain_semicolon() {
        let file = write_temp(b"id;name\n1;Alice\n");
        let outcome = sniff(file.path(), &NullProgress).unwrap();
        assert_eq!(outcome.delimiter, ';');
        assert_eq!(outcome.qualifier, None);
    }

    #[test]
    fn test_sniff_null_byte_header_is_not_text() {
        let file = write_temp(b"id\x00name\n1,2\n");
        let err = sniff(file.path(), &NullProgress).unwrap_err();
        assert!(matches!(err, RecordmendError::NotTextEncoding { .. }));
    }

    #[test]
    fn test_sniff_falls_back_to_windows_1252() {
        let file = write_temp(b"id;name\n1;caf\xe9\n");
        let outcome = sniff(file.path(), &NullProgress).unwrap();
        assert_eq!(outcome.encoding, TextEncoding::Windows1252);
        assert_eq!(outcome.delimiter, ';');
    }

    #[test]
    fn test_sniff_undecodable_under_both_encodings() {
        let file = write_temp(b"id;name\n1;bad\x81byte\n");
        let err = sniff(file.path(), &NullProgress).unwrap_err();
        assert!(matches!(
            err,
            RecordmendError::UndecodableBytes { ref lines, .. } if lines.len() == 1
        ));
    }

    #[test]
    fn test_sniff_no_delimiter_candidate() {
        let file = write_temp(b"justoneword\ndata\n");
        let err = sniff(file.path(), &NullProgress).unwrap_err();
        assert!(matches!(err, RecordmendError::DelimiterNotFound));
    }

    #[test]
    fn test_choose_spacer_prefers_second() {
        // Leading "#" spacer on an index column is skipped in favor of the
        // spacer between real field names.
        assert_eq!(choose_spacer("id,\"name\",\"x\"").unwrap(), "\",\"");
        assert_eq!(choose_spacer("id;name").unwrap(), ";");
        assert_eq!(choose_spacer("plain"), None);
    }

    #[test]
    fn test_find_unique_char_all_repeating() {
        assert_eq!(find_unique_char("\"\"\"\""), None);
        assert_eq!(find_unique_char("\",\""), Some(','));
    }

    #[test]
    fn test_to_config_seeds_analysis() {
        let file = write_temp(b"id,\"name\"\n1,\"Alice\"\n");
        let outcome = sniff(file.path(), &NullProgress).unwrap();
        let config = outcome.to_config(r"^\d+,").unwrap();
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.qualifier, Some('"'));
    }
}
