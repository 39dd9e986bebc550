//! Qualified-value extraction: the substrings of a record lying between
//! qualifier-delimiter boundary patterns.

use serde::{Deserialize, Serialize};

use crate::error::{RecordmendError, Result};

/// Hard ceiling on scan iterations. A scan that has not converged by then
/// is treated as an internal invariant violation rather than looping.
const SCAN_CEILING: usize = 100;

/// One qualified value found in a record, with its byte span (the span of
/// the value text itself, qualifiers excluded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedValue {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Extract the qualified values of `record` in scan order.
///
/// `start_pattern` is `delimiter + qualifier`; `end_pattern` is
/// `qualifier + delimiter`. A leading value (record begins with the
/// qualifier) and a trailing value (record ends with it) are recognized
/// before the interior scan. A value may legitimately contain an
/// `end_pattern` followed by text and another `end_pattern` with no
/// `start_pattern` between them; the scan skips ahead over such false ends.
///
/// Preconditions: `record` is non-empty and a qualifier is configured.
/// Violating either is a programming-contract error, not a data error.
pub fn extract_qualified_values(
    record: &str,
    qualifier: char,
    delimiter: char,
) -> Result<Vec<QualifiedValue>> {
    debug_assert!(!record.is_empty(), "scanned a blank record");

    let start_pat = format!("{delimiter}{qualifier}");
    let end_pat = format!("{qualifier}{delimiter}");
    let q_len = qualifier.len_utf8();
    let d_len = delimiter.len_utf8();

    let mut values = Vec::new();
    let mut start = 0;
    let mut end = record.len();

    // Leading value: the record opens with a qualifier rather than a full
    // start_pattern, so its value begins right after that qualifier.
    if record.starts_with(qualifier) {
        if let Some(pos) = find_from(record, &end_pat, q_len) {
            values.push(QualifiedValue {
                text: record[q_len..pos].to_string(),
                start: q_len,
                end: pos,
            });
            start = pos;
        }
    }

    // Trailing value: the record closes with a bare qualifier; its value
    // runs from the last start_pattern to just before that qualifier.
    if record.ends_with(qualifier) {
        let body_end = record.len() - q_len;
        if let Some(pos) = record[..body_end].rfind(&start_pat) {
            values.push(QualifiedValue {
                text: record[pos + start_pat.len()..body_end].to_string(),
                start: pos + start_pat.len(),
                end: body_end,
            });
            end = pos + d_len;
        }
    }

    let mut iterations = 0;
    while region_has_both(record, start, end, &start_pat, &end_pat) {
        let Some(value_start) = find_from(record, &start_pat, start) else {
            break;
        };
        let Some(end_position) = find_from(record, &end_pat, value_start + start_pat.len()) else {
            break;
        };
        let value_end = resolve_value_end(record, end_position, &start_pat, &end_pat, q_len)?;

        values.push(QualifiedValue {
            text: record[value_start + start_pat.len()..value_end].to_string(),
            start: value_start + start_pat.len(),
            end: value_end,
        });
        start = value_end + q_len;

        iterations += 1;
        if iterations > SCAN_CEILING {
            return Err(RecordmendError::ScanDidNotConverge {
                limit: SCAN_CEILING,
            });
        }
    }

    Ok(values)
}

/// Whether the unscanned region still holds a start and an end boundary.
fn region_has_both(record: &str, start: usize, end: usize, start_pat: &str, end_pat: &str) -> bool {
    if start >= end {
        return false;
    }
    match record.get(start..end) {
        Some(region) => region.contains(start_pat) && region.contains(end_pat),
        None => false,
    }
}

fn find_from(record: &str, pattern: &str, from: usize) -> Option<usize> {
    record.get(from..)?.find(pattern).map(|i| i + from)
}

/// Resolve the true end of a value starting from a candidate `end_pattern`
/// position: while the next `end_pattern` comes before any `start_pattern`
/// (or no `start_pattern` remains), the candidate was literal content, so
/// skip ahead to that later `end_pattern`. Bounded so pathological records
/// surface an error instead of spinning.
fn resolve_value_end(
    record: &str,
    mut end_position: usize,
    start_pat: &str,
    end_pat: &str,
    q_len: usize,
) -> Result<usize> {
    let mut skips = 0;
    loop {
        let next_start = find_from(record, start_pat, end_position + q_len);
        let next_end = find_from(record, end_pat, end_position + q_len);
        match (next_end, next_start) {
            (Some(ne), Some(ns)) if ne < ns => end_position = ne,
            (Some(ne), None) => end_position = ne,
            _ => return Ok(end_position),
        }
        skips += 1;
        if skips > SCAN_CEILING {
            return Err(RecordmendError::ScanDidNotConverge {
                limit: SCAN_CEILING,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[QualifiedValue]) -> Vec<&str> {
        values.iter().map(|v| v.text.as_str()).collect()
    }

    #[test]
    fn test_leading_and_trailing_values_exact_bounds() {
        let record = "\"a\",\"b\"";
        let values = extract_qualified_values(record, '"', ',').unwrap();
        assert_eq!(texts(&values), vec!["a", "b"]);

        // Bounds line up with the quote positions exactly.
        assert_eq!((values[0].start, values[0].end), (1, 2));
        assert_eq!((values[1].start, values[1].end), (5, 6));
        assert_eq!(&record[values[0].start..values[0].end], "a");
        assert_eq!(&record[values[1].start..values[1].end], "b");
    }

    #[test]
    fn test_interior_value_with_embedded_delimiter() {
        let values = extract_qualified_values("x,\"a,b\",y", '"', ',').unwrap();
        assert_eq!(texts(&values), vec!["a,b"]);
    }

    #[test]
    fn test_adjacent_values_are_not_merged() {
        let values = extract_qualified_values("a,\"one\",\"two\",z", '"', ',').unwrap();
        assert_eq!(texts(&values), vec!["one", "two"]);
    }

    #[test]
    fn test_false_end_is_skipped() {
        // The quote after "x" closes nothing; the value runs to the last
        // end pattern because no start pattern follows.
        let values = extract_qualified_values("a,\"x\",y\",z", '"', ',').unwrap();
        assert_eq!(texts(&values), vec!["x\",y"]);
    }

    #[test]
    fn test_scan_ceiling_surfaces_internal_error() {
        let record: Vec<String> = (0..120).map(|i| format!("\"v{i}\"")).collect();
        let record = record.join(",");
        let err = extract_qualified_values(&record, '"', ',').unwrap_err();
        assert!(matches!(err, RecordmendError::ScanDidNotConverge { .. }));
    }

    #[test]
    fn test_record_without_boundaries_yields_nothing() {
        let values = extract_qualified_values("a,b,c", '"', ',').unwrap();
        assert!(values.is_empty());
    }
}
