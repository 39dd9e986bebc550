//! True delimiter counting: field-separating delimiters only, excluding
//! delimiters embedded inside qualified values.

use serde::{Deserialize, Serialize};

use crate::config::FileConfig;
use crate::error::Result;

use super::scan::extract_qualified_values;

/// How a record's true delimiter count compares to the header's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelimiterClass {
    Matches,
    /// Fewer delimiters than the header: information about the intended
    /// structure has been lost, generally unrecoverable automatically.
    TooFew,
    /// More delimiters than the header: potentially recoverable by merging
    /// over-split tokens.
    TooMany,
}

impl DelimiterClass {
    fn from_counts(count: usize, expected: usize) -> Self {
        match count.cmp(&expected) {
            std::cmp::Ordering::Equal => DelimiterClass::Matches,
            std::cmp::Ordering::Less => DelimiterClass::TooFew,
            std::cmp::Ordering::Greater => DelimiterClass::TooMany,
        }
    }
}

/// A record whose true delimiter count disagrees with the header's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadDelimiterRecord {
    /// The raw record text.
    pub record: String,
    /// The computed true delimiter count.
    pub count: usize,
    /// The header's expected delimiter count.
    pub expected: usize,
    /// Whether the record has too few or too many delimiters.
    pub class: DelimiterClass,
}

/// Compute a record's true delimiter count and classify it against the
/// header's expected count.
///
/// A literal count that already matches is accepted without looking at
/// qualified values. On a mismatch with a qualifier configured and present,
/// the count is recomputed to exclude value-internal delimiters: under the
/// all-values-qualified policy the record is split on the
/// `qualifier delimiter qualifier` boundary, otherwise qualified values are
/// extracted and their internal delimiters subtracted from the literal
/// count.
pub fn true_delimiter_count(
    record: &str,
    config: &FileConfig,
    expected: usize,
) -> Result<(usize, DelimiterClass)> {
    let raw = record.matches(config.delimiter).count();
    if raw == expected {
        return Ok((raw, DelimiterClass::Matches));
    }

    let count = match config.qualifier {
        Some(q) if record.contains(q) => {
            if config.all_qualified {
                let boundary = config
                    .all_qualified_pattern()
                    .expect("qualifier is configured");
                record.split(boundary.as_str()).count() - 1
            } else {
                let embedded: usize = extract_qualified_values(record, q, config.delimiter)?
                    .iter()
                    .map(|v| v.text.matches(config.delimiter).count())
                    .sum();
                raw - embedded.min(raw)
            }
        }
        _ => raw,
    };

    Ok((count, DelimiterClass::from_counts(count, expected)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextEncoding;

    fn config(qualifier: &str, all_qualified: bool) -> FileConfig {
        FileConfig::build(r"^\d+", ",", qualifier, TextEncoding::Utf8)
            .unwrap()
            .with_all_qualified(all_qualified)
    }

    #[test]
    fn test_literal_count_without_qualifier() {
        let config = config("", true);
        let (count, class) = true_delimiter_count("1,Alice,hello", &config, 2).unwrap();
        assert_eq!(count, 2);
        assert_eq!(class, DelimiterClass::Matches);

        let (count, class) =
            true_delimiter_count("2,Bob,hi there, friend", &config, 2).unwrap();
        assert_eq!(count, 3);
        assert_eq!(class, DelimiterClass::TooMany);
    }

    #[test]
    fn test_too_few_classification() {
        let config = config("", true);
        let (count, class) = true_delimiter_count("3,Carol", &config, 2).unwrap();
        assert_eq!(count, 1);
        assert_eq!(class, DelimiterClass::TooFew);
    }

    #[test]
    fn test_embedded_delimiters_subtracted_per_value() {
        let config = config("\"", false);
        // Raw count is 3 but one comma sits inside the qualified value.
        let (count, class) = true_delimiter_count("1,\"a,b\",x", &config, 2).unwrap();
        assert_eq!(count, 2);
        assert_eq!(class, DelimiterClass::Matches);
    }

    #[test]
    fn test_all_qualified_boundary_split() {
        let config = config("\"", true);
        let (count, class) =
            true_delimiter_count("\"1\",\"a,b\",\"x\"", &config, 2).unwrap();
        assert_eq!(count, 2);
        assert_eq!(class, DelimiterClass::Matches);
    }
}
