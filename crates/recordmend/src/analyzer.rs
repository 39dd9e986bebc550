//! Analysis orchestration: drives record reassembly over a whole file,
//! applies the escape and delimiter-count checks, writes the normalized
//! output, and classifies the run.

use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::FileConfig;
use crate::error::{RecordmendError, Result};
use crate::input::read_decoded_lines;
use crate::progress::{CancelToken, ProgressSink};
use crate::record::{
    BadDelimiterRecord, BadEscapeRecord, DelimiterClass, RecordReassembler,
    extract_qualified_values, has_unescaped_qualifiers, true_delimiter_count,
};

/// Overall classification of an analysis pass.
///
/// The numeric codes are a stable part of the result contract; negative
/// codes mark runs that need attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Code 1: no findings, no fix needed.
    Clean,
    /// Code -1: bad escapes and bad delimiter counts both present;
    /// unrepairable automatically.
    MixedIssues,
    /// Code -2: bad escapes only; repaired automatically.
    EscapesRepaired,
    /// Code -3: too-many-delimiter records without a qualifier; repairable
    /// through the manual merge workflow.
    MergeRepairable,
    /// Code -4: records with too few delimiters; structure loss.
    TooFewDelimiters,
    /// Code -5: bad delimiter counts with a qualifier configured;
    /// unrepairable automatically.
    QualifiedDelimiterMismatch,
    /// Code -6: clean records, but overflow lines exist and no qualifier is
    /// configured; structurally fragile.
    FragileOverflow,
    /// Code -7: no decision-table row applied. Indicates a classification
    /// defect, never a property of the input.
    ClassificationGap,
}

impl Outcome {
    /// Stable numeric code for this outcome.
    pub fn code(&self) -> i32 {
        match self {
            Outcome::Clean => 1,
            Outcome::MixedIssues => -1,
            Outcome::EscapesRepaired => -2,
            Outcome::MergeRepairable => -3,
            Outcome::TooFewDelimiters => -4,
            Outcome::QualifiedDelimiterMismatch => -5,
            Outcome::FragileOverflow => -6,
            Outcome::ClassificationGap => -7,
        }
    }

    /// Guidance text for a human resolving this outcome.
    pub fn guidance(&self) -> &'static str {
        match self {
            Outcome::Clean => "No fix needed.",
            Outcome::MixedIssues => {
                "Unescaped qualifiers and records with improper delimiter counts both \
                 exist. No automatic fix is available, since assumptions about either \
                 issue could corrupt the other. Report the issue to the data owner or \
                 try a different record-start pattern."
            }
            Outcome::EscapesRepaired => {
                "Unescaped qualifiers exist within the data. The issues have been \
                 repaired and the fixed output is available for export."
            }
            Outcome::MergeRepairable => {
                "Records with improper delimiter counts exist. Merge the over-split \
                 values that contain the delimiter but are not qualified to restore \
                 the original structure of the data."
            }
            Outcome::TooFewDelimiters => {
                "Records with too few delimiters exist. The intended structure cannot \
                 be inferred automatically; a more precise record-start pattern may \
                 categorize records better. If all else fails, contact the data owner."
            }
            Outcome::QualifiedDelimiterMismatch => {
                "Records with improper delimiter counts exist, but a qualifier is \
                 present, so values cannot be merged and re-qualified automatically. \
                 This may point to a bad record-start pattern."
            }
            Outcome::FragileOverflow => {
                "No issues found with the records, but overflow lines were folded \
                 together without a qualifier configured. Most parsers will not read \
                 this file reliably; export the normalized output to qualify and \
                 restructure the data."
            }
            Outcome::ClassificationGap => {
                "Unexpected combination of findings. Please report this case and the \
                 analysis logs as a defect."
            }
        }
    }
}

/// Apply the fixed outcome decision table.
///
/// Total and deterministic over its five inputs; `ClassificationGap` is
/// unreachable under the documented rules and exists so a future logic gap
/// surfaces as a defect instead of being swallowed.
pub fn classify_outcome(
    has_bad_escapes: bool,
    has_bad_delimiters: bool,
    has_qualifier: bool,
    saw_too_few: bool,
    has_overflow: bool,
) -> Outcome {
    if has_bad_escapes && has_bad_delimiters {
        Outcome::MixedIssues
    } else if has_bad_escapes {
        Outcome::EscapesRepaired
    } else if has_bad_delimiters && !has_qualifier && !saw_too_few {
        Outcome::MergeRepairable
    } else if has_bad_delimiters && saw_too_few {
        Outcome::TooFewDelimiters
    } else if has_bad_delimiters && has_qualifier {
        Outcome::QualifiedDelimiterMismatch
    } else if !has_bad_delimiters && !has_bad_escapes {
        if has_overflow && !has_qualifier {
            Outcome::FragileOverflow
        } else {
            Outcome::Clean
        }
    } else {
        Outcome::ClassificationGap
    }
}

/// Result of one full analysis pass. Immutable once returned.
///
/// The normalized output artifact is owned by this result: it is deleted
/// when the result is dropped, unless [`persist_output`] moves it to a
/// caller-chosen location first.
///
/// [`persist_output`]: AnalysisResult::persist_output
#[derive(Debug)]
pub struct AnalysisResult {
    /// Overall classification of the run.
    pub outcome: Outcome,
    /// The normalized output: one record per line, `\n` terminated, UTF-8.
    pub output: NamedTempFile,
    /// Delimiter the analysis ran with.
    pub delimiter: char,
    /// Column names from the header line, qualifiers stripped.
    pub columns: Vec<String>,
    /// Physical line numbers folded into preceding records.
    pub overflow_lines: Vec<usize>,
    /// Guidance text for the outcome.
    pub message: String,
    /// Records whose true delimiter count disagreed with the header.
    pub bad_delimiters: Vec<BadDelimiterRecord>,
    /// Records with unescaped qualifiers, with their repairs derivable.
    pub bad_escapes: Vec<BadEscapeRecord>,
}

impl AnalysisResult {
    /// Path of the normalized output artifact.
    pub fn output_path(&self) -> &Path {
        self.output.path()
    }

    /// Move the normalized output to `dest`, consuming the result.
    pub fn persist_output(self, dest: impl AsRef<Path>) -> Result<PathBuf> {
        let dest = dest.as_ref();
        self.output
            .persist(dest)
            .map_err(|e| RecordmendError::Persist {
                path: dest.to_path_buf(),
                source: e.error,
            })?;
        Ok(dest.to_path_buf())
    }
}

/// Drives one analysis pass over a file. Owns its buffers and file handles
/// exclusively; concurrent analyses of different files share nothing.
pub struct Analyzer {
    config: FileConfig,
    header_line: String,
    columns: Vec<String>,
    header_delimiter_count: usize,
    body: Vec<String>,
}

impl Analyzer {
    /// Read and decode the file, capture the header, and prepare a pass.
    ///
    /// The configuration is assumed validated (see [`FileConfig::build`]);
    /// decoding failures surface here as typed errors before any analysis
    /// work starts.
    pub fn new(config: FileConfig, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut lines = read_decoded_lines(path, config.encoding)?;
        if lines.is_empty() {
            return Err(RecordmendError::EmptyData(format!(
                "'{}' has no header line",
                path.display()
            )));
        }
        let header_line = lines.remove(0);

        let columns = header_line
            .split(config.delimiter)
            .map(|name| match config.qualifier {
                Some(q) => name.replace(q, ""),
                None => name.to_string(),
            })
            .collect();
        let header_delimiter_count = header_line.matches(config.delimiter).count();

        Ok(Self {
            config,
            header_line,
            columns,
            header_delimiter_count,
            body: lines,
        })
    }

    /// Column names derived from the header line.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Run the full pass: reassemble records, check each one, write the
    /// normalized output, and classify the run.
    ///
    /// Cancellation is polled once per logical record; a cancelled pass
    /// discards the partial artifact and returns
    /// [`RecordmendError::Cancelled`].
    pub fn analyze(
        &self,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<AnalysisResult> {
        let mut output = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .map_err(|e| RecordmendError::Io {
                path: std::env::temp_dir(),
                source: e,
            })?;

        progress.emit(&format!(
            "Writing normalized output to {}",
            output.path().display()
        ));
        write_record(&mut output, &self.header_line)?;

        let mut bad_escapes: Vec<BadEscapeRecord> = Vec::new();
        let mut bad_delimiters: Vec<BadDelimiterRecord> = Vec::new();
        let mut overflow_lines: Vec<usize> = Vec::new();
        let mut saw_too_few = false;

        progress.emit("Reassembling records and checking values");
        let reassembler =
            RecordReassembler::new(&self.config, &self.body, self.header_delimiter_count);

        for record in reassembler {
            if cancel.is_cancelled() {
                return Err(RecordmendError::Cancelled);
            }
            overflow_lines.extend(record.overflow_lines);

            let mut text = record.text;
            let mut is_bad = false;

            if let Some(q) = self.config.qualifier {
                if text.contains(q) {
                    if self.config.all_qualified && text.ends_with(self.config.delimiter) {
                        text.truncate(text.len() - self.config.delimiter.len_utf8());
                    }
                    let offending = self.offending_values(&text, q)?;
                    if !offending.is_empty() {
                        bad_escapes.push(BadEscapeRecord {
                            qualifier: q,
                            record: text.clone(),
                            offending_values: offending,
                        });
                        is_bad = true;
                    }
                }
            }

            let (count, class) =
                true_delimiter_count(&text, &self.config, self.header_delimiter_count)?;
            if class != DelimiterClass::Matches {
                saw_too_few |= class == DelimiterClass::TooFew;
                bad_delimiters.push(BadDelimiterRecord {
                    record: text.clone(),
                    count,
                    expected: self.header_delimiter_count,
                    class,
                });
                is_bad = true;
            }

            if !is_bad {
                write_record(&mut output, &text)?;
            }
        }

        // Output-ordering contract: repaired escape records are appended
        // after the clean records, not restored to their original position.
        progress.emit("Writing repaired records");
        for bad in &bad_escapes {
            write_record(&mut output, &bad.fixed_record())?;
        }

        progress.emit("Classifying outcome");
        let outcome = classify_outcome(
            !bad_escapes.is_empty(),
            !bad_delimiters.is_empty(),
            self.config.qualifier.is_some(),
            saw_too_few,
            !overflow_lines.is_empty(),
        );

        Ok(AnalysisResult {
            outcome,
            output,
            delimiter: self.config.delimiter,
            columns: self.columns.clone(),
            overflow_lines,
            message: outcome.guidance().to_string(),
            bad_delimiters,
            bad_escapes,
        })
    }

    /// The values of one record that fail the escape check, under the
    /// configured quoting policy.
    fn offending_values(&self, text: &str, qualifier: char) -> Result<Vec<String>> {
        let checks: Vec<String> = if self.config.all_qualified {
            let boundary = self
                .config
                .all_qualified_pattern()
                .expect("qualifier configured");
            interior(text)
                .split(boundary.as_str())
                .map(str::to_owned)
                .collect()
        } else {
            extract_qualified_values(text, qualifier, self.config.delimiter)?
                .into_iter()
                .map(|v| v.text)
                .collect()
        };
        Ok(checks
            .into_iter()
            .filter(|value| has_unescaped_qualifiers(value, qualifier))
            .collect())
    }
}

fn write_record(output: &mut NamedTempFile, text: &str) -> Result<()> {
    use std::io::Write;
    writeln!(output.as_file_mut(), "{text}").map_err(|e| RecordmendError::Io {
        path: output.path().to_path_buf(),
        source: e,
    })
}

/// The text with its first and last characters dropped: the interior of an
/// all-values-qualified record.
fn interior(text: &str) -> &str {
    let mut chars = text.chars();
    let Some(first) = chars.next() else { return "" };
    let Some(last) = chars.next_back() else { return "" };
    &text[first.len_utf8()..text.len() - last.len_utf8()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_is_total_and_never_gaps() {
        for mask in 0..32u8 {
            let outcome = classify_outcome(
                mask & 1 != 0,
                mask & 2 != 0,
                mask & 4 != 0,
                mask & 8 != 0,
                mask & 16 != 0,
            );
            assert_ne!(
                outcome,
                Outcome::ClassificationGap,
                "flag combination {mask:#07b} fell through the decision table"
            );
        }
    }

    #[test]
    fn test_decision_table_rows() {
        assert_eq!(classify_outcome(true, true, false, false, false).code(), -1);
        assert_eq!(classify_outcome(true, false, true, false, false).code(), -2);
        assert_eq!(classify_outcome(false, true, false, false, false).code(), -3);
        assert_eq!(classify_outcome(false, true, false, true, false).code(), -4);
        assert_eq!(classify_outcome(false, true, true, false, false).code(), -5);
        assert_eq!(classify_outcome(false, false, false, false, true).code(), -6);
        assert_eq!(classify_outcome(false, false, true, false, true).code(), 1);
        assert_eq!(classify_outcome(false, false, false, false, false).code(), 1);
    }

    #[test]
    fn test_interior_drops_edge_characters() {
        assert_eq!(interior("\"a\",\"b\""), "a\",\"b");
        assert_eq!(interior("ab"), "");
        assert_eq!(interior("a"), "");
        assert_eq!(interior(""), "");
    }
}
