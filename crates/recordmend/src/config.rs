//! File configuration: record-start pattern, delimiter, qualifier, encoding.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{RecordmendError, Result};

/// The two candidate text encodings the engine supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// Primary encoding; tried first.
    Utf8,
    /// Single-byte fallback for files that fail UTF-8 decoding.
    Windows1252,
}

/// Windows-1252 leaves five bytes unmapped; a strict decoder rejects them.
const UNMAPPED_1252: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

impl TextEncoding {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }

    /// Decode one physical line. Returns `None` when the bytes are not
    /// valid under this encoding.
    pub fn decode_line(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            TextEncoding::Windows1252 => {
                if bytes.iter().any(|b| UNMAPPED_1252.contains(b)) {
                    return None;
                }
                let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
                Some(text.into_owned())
            }
        }
    }
}

/// Validated configuration for one analysis run.
///
/// Built through [`FileConfig::build`], which reports every invalid option
/// at once before any file I/O happens.
#[derive(Debug, Clone)]
pub struct FileConfig {
    /// Pattern a physical line must match (at its start) to open a new
    /// logical record.
    pub record_start: Regex,
    /// Field separator; always exactly one character.
    pub delimiter: char,
    /// Optional character wrapping field values.
    pub qualifier: Option<char>,
    /// Encoding used to decode the file.
    pub encoding: TextEncoding,
    /// Policy switch: when true, every value is assumed to be qualified and
    /// records are split on the `qualifier delimiter qualifier` boundary;
    /// when false, only explicitly qualified values are extracted by the
    /// scanner. The historical default is true even though per-value
    /// scanning looks like the intended behavior; exposed here as an
    /// explicit choice rather than silently changed.
    pub all_qualified: bool,
}

impl FileConfig {
    /// Validate raw option strings and build a configuration.
    ///
    /// `delimiter` accepts a literal character or the two-character escape
    /// `\t` for a tab. `qualifier` must be empty or a single character.
    /// All violations are collected and reported together as a single
    /// [`RecordmendError::Config`].
    pub fn build(
        record_start_pattern: &str,
        delimiter: &str,
        qualifier: &str,
        encoding: TextEncoding,
    ) -> Result<Self> {
        let mut errors = Vec::new();

        let record_start = match Regex::new(record_start_pattern) {
            Ok(re) => Some(re),
            Err(_) => {
                errors.push("record-start pattern does not compile".to_string());
                None
            }
        };

        let unescaped = delimiter.replace("\\t", "\t");
        let mut delim_chars = unescaped.chars();
        let delimiter = match (delim_chars.next(), delim_chars.next()) {
            (Some(c), None) => Some(c),
            _ => {
                errors.push("delimiter must be a single character or \\t".to_string());
                None
            }
        };

        let mut qual_chars = qualifier.chars();
        let qualifier = match (qual_chars.next(), qual_chars.next()) {
            (None, _) => Some(None),
            (Some(c), None) => Some(Some(c)),
            _ => {
                errors.push("qualifier must be a single character or blank".to_string());
                None
            }
        };

        if !errors.is_empty() {
            return Err(RecordmendError::Config(errors.join("\n")));
        }

        Ok(Self {
            record_start: record_start.expect("validated above"),
            delimiter: delimiter.expect("validated above"),
            qualifier: qualifier.expect("validated above"),
            encoding,
            all_qualified: true,
        })
    }

    /// Override the uniform-quoting policy (see [`FileConfig::all_qualified`]).
    pub fn with_all_qualified(mut self, all_qualified: bool) -> Self {
        self.all_qualified = all_qualified;
        self
    }

    /// `delimiter + qualifier`: the boundary that opens a qualified value.
    pub fn start_pattern(&self) -> Option<String> {
        self.qualifier
            .map(|q| format!("{}{}", self.delimiter, q))
    }

    /// `qualifier + delimiter`: the boundary that closes a qualified value.
    pub fn end_pattern(&self) -> Option<String> {
        self.qualifier
            .map(|q| format!("{}{}", q, self.delimiter))
    }

    /// `qualifier + delimiter + qualifier`: the field boundary under the
    /// all-values-qualified policy.
    pub fn all_qualified_pattern(&self) -> Option<String> {
        self.qualifier
            .map(|q| format!("{}{}{}", q, self.delimiter, q))
    }
}
