//! Error types for the recordmend library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for recordmend operations.
///
/// Data-quality findings (bad escapes, bad delimiters, overflow lines) are
/// *not* errors; they are carried inside a successful
/// [`AnalysisResult`](crate::AnalysisResult). This enum covers configuration
/// problems, I/O and decoding failures, sniffing misses, and internal
/// invariant violations.
#[derive(Debug, Error)]
pub enum RecordmendError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more invalid file options, reported as a batch before any I/O.
    #[error("Configuration error:\n{0}")]
    Config(String),

    /// The header line contains a null byte, so the file is not a
    /// single-byte or UTF-8 text encoding this library supports.
    #[error(
        "found null byte in the header line of '{path}'; \
         the file does not appear to use a supported text encoding"
    )]
    NotTextEncoding { path: PathBuf },

    /// Lines that decode under neither UTF-8 nor the Windows-1252 fallback.
    #[error(
        "'{path}' is not UTF-8 and the Windows-1252 fallback also failed; \
         unreadable lines:\n{}", lines.join("\n")
    )]
    UndecodableBytes { path: PathBuf, lines: Vec<String> },

    /// The sniffing heuristic could not propose a delimiter. The caller may
    /// still supply a configuration manually and proceed to analysis.
    #[error("could not find a delimiter in the header line")]
    DelimiterNotFound,

    /// Empty file or no data to analyze.
    #[error("empty data: {0}")]
    EmptyData(String),

    /// The qualified-value scan exceeded its iteration ceiling. This is an
    /// internal invariant violation (the scan failed to converge), not a
    /// property of the input data.
    #[error("qualified-value scan exceeded {limit} iterations without converging")]
    ScanDidNotConverge { limit: usize },

    /// The analysis pass was cancelled between records; the partial output
    /// artifact has been discarded.
    #[error("analysis cancelled")]
    Cancelled,

    /// Invalid manual-merge operation.
    #[error("merge error: {0}")]
    Merge(String),

    /// Error persisting the normalized output artifact.
    #[error("failed to persist output to '{path}': {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library while loading the output preview.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for recordmend operations.
pub type Result<T> = std::result::Result<T, RecordmendError>;
