//! Recordmend: detection-and-repair engine for malformed delimited text
//! files.
//!
//! CSV/TSV-like exports often break the "one record per line, fixed
//! delimiter count" model: records wrap across physical lines, qualifier
//! characters appear without being doubled, and delimiter counts drift.
//! Recordmend sniffs the format, reassembles logical records from the
//! physical-line stream, detects and repairs unescaped qualifiers,
//! classifies delimiter-count mismatches, and writes a normalized output
//! file, reporting the whole run as one of a fixed set of outcomes.
//!
//! # Principles
//!
//! - **Heuristic, never fatal**: analysis always completes and returns a
//!   classified result; bad records are findings, not errors.
//! - **Diagnostic detail**: offending lines and values are preserved so a
//!   human can resolve residual ambiguity.
//! - **Bounded**: adversarial input surfaces a typed internal failure
//!   rather than a hang or a crash.
//!
//! # Example
//!
//! ```no_run
//! use recordmend::{Analyzer, CancelToken, FileConfig, NullProgress, TextEncoding};
//!
//! let config = FileConfig::build(r"^\d+,", ",", "\"", TextEncoding::Utf8).unwrap();
//! let analyzer = Analyzer::new(config, "export.csv").unwrap();
//! let result = analyzer.analyze(&NullProgress, &CancelToken::new()).unwrap();
//!
//! println!("outcome {}: {}", result.outcome.code(), result.message);
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod merge;
pub mod progress;
pub mod record;
pub mod sniff;

mod input;

pub use analyzer::{AnalysisResult, Analyzer, Outcome, classify_outcome};
pub use config::{FileConfig, TextEncoding};
pub use error::{RecordmendError, Result};
pub use merge::{MergeEdit, MergeTable};
pub use progress::{CancelToken, NullProgress, ProgressSink};
pub use record::{
    BadDelimiterRecord, BadEscapeRecord, DelimiterClass, LogicalRecord, QualifiedValue,
    RecordReassembler, extract_qualified_values, has_unescaped_qualifiers, true_delimiter_count,
};
pub use sniff::{SniffOutcome, sniff};
