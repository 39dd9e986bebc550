//! Unescaped-qualifier detection and repair.
//!
//! A qualifier that must appear literally inside a qualified value is
//! doubled. Any interior run of qualifier characters with odd length
//! therefore marks an improperly escaped value.

use serde::{Deserialize, Serialize};

/// Whether `value` contains an improperly escaped qualifier.
///
/// Scans the maximal runs of the qualifier character that are bounded by
/// non-qualifier characters on both sides; an odd-length run means an
/// unescaped occurrence. Runs touching the start or end of the value are
/// not interior and do not count.
pub fn has_unescaped_qualifiers(value: &str, qualifier: char) -> bool {
    let mut chars = value.chars().peekable();
    let mut prev_was_text = false;

    while let Some(c) = chars.next() {
        if c != qualifier {
            prev_was_text = true;
            continue;
        }
        let mut run = 1usize;
        while chars.peek() == Some(&qualifier) {
            chars.next();
            run += 1;
        }
        let followed_by_text = chars.peek().is_some();
        if prev_was_text && followed_by_text && run % 2 != 0 {
            return true;
        }
        prev_was_text = false;
    }
    false
}

/// A record whose qualified values contain unescaped qualifiers, together
/// with the offending values. The repaired form is derived on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadEscapeRecord {
    /// The qualifier in effect for this record.
    pub qualifier: char,
    /// The raw record text, pre-repair.
    pub record: String,
    /// The improperly escaped values, in scan order.
    pub offending_values: Vec<String>,
}

impl BadEscapeRecord {
    /// The repaired record: for each offending value, the span
    /// `qualifier + value + qualifier` is rewritten with every qualifier
    /// inside the value doubled. Applied value by value, so correctly
    /// escaped spans elsewhere in the record are left alone. Behavior is
    /// undefined when offending values overlap as substrings.
    pub fn fixed_record(&self) -> String {
        let q = self.qualifier;
        self.offending_values.iter().fold(
            self.record.clone(),
            |record, value| {
                let doubled = value.replace(q, &format!("{q}{q}"));
                record.replace(
                    &format!("{q}{value}{q}"),
                    &format!("{q}{doubled}{q}"),
                )
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_interior_run_is_unescaped() {
        assert!(has_unescaped_qualifiers("Alice, \"Ann\"  Smith", '"'));
        assert!(has_unescaped_qualifiers("a\"\"\"b", '"'));
    }

    #[test]
    fn test_doubled_runs_are_escaped() {
        assert!(!has_unescaped_qualifiers("Alice, \"\"Ann\"\"  Smith", '"'));
        assert!(!has_unescaped_qualifiers("no qualifiers here", '"'));
    }

    #[test]
    fn test_edge_runs_are_not_interior() {
        assert!(!has_unescaped_qualifiers("\"leading", '"'));
        assert!(!has_unescaped_qualifiers("trailing\"", '"'));
        assert!(!has_unescaped_qualifiers("\"", '"'));
    }

    #[test]
    fn test_fixed_record_doubles_only_offending_span() {
        let bad = BadEscapeRecord {
            qualifier: '"',
            record: "1,\"Alice, \"Ann\"  Smith\"".to_string(),
            offending_values: vec!["Alice, \"Ann\"  Smith".to_string()],
        };
        assert_eq!(bad.fixed_record(), "1,\"Alice, \"\"Ann\"\"  Smith\"");
    }

    #[test]
    fn test_repair_is_idempotent() {
        let bad = BadEscapeRecord {
            qualifier: '"',
            record: "1,\"he said \"hi\" twice\"".to_string(),
            offending_values: vec!["he said \"hi\" twice".to_string()],
        };
        let fixed = bad.fixed_record();
        // Every interior run in the repaired value is now even.
        assert!(!has_unescaped_qualifiers(
            &fixed[3..fixed.len() - 1],
            '"'
        ));
    }
}
