//! Manual merge workflow for too-many-delimiter records.
//!
//! When a record was over-split because an unqualified value contains the
//! delimiter, a human can repair it by merging the adjacent over-split
//! tokens back into one value. The table here holds the split bad records,
//! a short preview of known-good records for context, and a linear
//! undo/redo history of the merges applied.
//!
//! The table is exclusively owned by one editing session; it is never
//! mutated concurrently with reads.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalysisResult, Outcome};
use crate::error::{RecordmendError, Result};

/// Number of good records loaded from the normalized output as context.
const PREVIEW_ROWS: usize = 10;

/// One applied merge, with the row snapshot needed to undo it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeEdit {
    /// Index into the bad-record rows.
    pub row: usize,
    /// First merged column.
    pub start: usize,
    /// Last merged column (inclusive).
    pub end: usize,
    /// The row's values before the merge.
    pub old_row: Vec<String>,
}

/// Editable table of over-split records, with undo/redo.
#[derive(Debug)]
pub struct MergeTable {
    delimiter: char,
    columns: Vec<String>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    preview: Vec<Vec<String>>,
    edits: Vec<MergeEdit>,
    cursor: usize,
}

impl MergeTable {
    /// Build a merge table from a merge-repairable analysis result.
    ///
    /// Splits each bad record by the delimiter and loads up to
    /// [`PREVIEW_ROWS`] good records back out of the normalized output for
    /// side-by-side context.
    pub fn from_result(result: &AnalysisResult) -> Result<Self> {
        if result.outcome != Outcome::MergeRepairable {
            return Err(RecordmendError::Merge(format!(
                "merge table requires a merge-repairable analysis, got outcome code {}",
                result.outcome.code()
            )));
        }

        let rows: Vec<Vec<String>> = result
            .bad_delimiters
            .iter()
            .map(|bad| {
                bad.record
                    .split(result.delimiter)
                    .map(str::to_owned)
                    .collect()
            })
            .collect();

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut headers = result.columns.clone();
        for i in 0..width.saturating_sub(result.columns.len()) {
            headers.push(format!("extra{}", i + 1));
        }

        let preview = load_preview(result.output_path(), result.delimiter, result.columns.len())?;

        Ok(Self {
            delimiter: result.delimiter,
            columns: result.columns.clone(),
            headers,
            rows,
            preview,
            edits: Vec::new(),
            cursor: 0,
        })
    }

    /// Column headers: the real columns followed by `extra1..extraN`
    /// placeholders up to the widest bad record.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The bad records, split into editable values.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Known-good records loaded from the normalized output.
    pub fn preview_rows(&self) -> &[Vec<String>] {
        &self.preview
    }

    /// Edits applied so far, oldest first. Entries past the cursor have
    /// been undone.
    pub fn edits(&self) -> &[MergeEdit] {
        &self.edits
    }

    /// Merge the values of `row` from column `start` through `end`
    /// (inclusive) into one value, rejoined with the delimiter.
    ///
    /// Appending while the cursor is not at the end of the history
    /// truncates the undone future edits, standard linear-history style.
    pub fn merge(&mut self, row: usize, start: usize, end: usize) -> Result<()> {
        let Some(values) = self.rows.get(row) else {
            return Err(RecordmendError::Merge(format!(
                "row {row} is out of range"
            )));
        };
        if start >= end || end >= values.len() {
            return Err(RecordmendError::Merge(format!(
                "cannot merge columns {start}..={end} of a {}-value row",
                values.len()
            )));
        }

        let old_row = values.clone();
        self.rows[row] = merged_row(&old_row, start, end, self.delimiter);

        self.edits.truncate(self.cursor);
        self.edits.push(MergeEdit {
            row,
            start,
            end,
            old_row,
        });
        self.cursor += 1;
        Ok(())
    }

    /// Step the cursor back one edit, restoring the prior row snapshot.
    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let edit = &self.edits[self.cursor];
        self.rows[edit.row] = edit.old_row.clone();
        true
    }

    /// Step the cursor forward one edit, reapplying the merge. Returns
    /// false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        if self.cursor == self.edits.len() {
            return false;
        }
        let edit = self.edits[self.cursor].clone();
        self.rows[edit.row] = merged_row(&edit.old_row, edit.start, edit.end, self.delimiter);
        self.cursor += 1;
        true
    }

    /// Whether every bad record now has exactly the expected column count.
    pub fn all_fixed(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.columns.len())
    }

    /// The repaired records, rejoined with the delimiter, for export.
    pub fn fixed_records(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.join(&self.delimiter.to_string()))
            .collect()
    }
}

fn merged_row(old_row: &[String], start: usize, end: usize, delimiter: char) -> Vec<String> {
    let merged = old_row[start..=end].join(&delimiter.to_string());
    let mut row: Vec<String> = old_row[..start].to_vec();
    row.push(merged);
    row.extend_from_slice(&old_row[end + 1..]);
    row
}

/// Read the first good records back out of the normalized output, padded
/// to the real column width. The csv reader needs a single-byte delimiter;
/// a non-ASCII delimiter yields an empty preview.
fn load_preview(path: &Path, delimiter: char, width: usize) -> Result<Vec<Vec<String>>> {
    if !delimiter.is_ascii() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .quoting(false)
        .flexible(true)
        .from_path(path)?;

    let mut preview = Vec::new();
    for record in reader.records().take(PREVIEW_ROWS) {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(str::to_owned).collect();
        while row.len() < width {
            row.push(String::new());
        }
        row.truncate(width);
        preview.push(row);
    }
    Ok(preview)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> MergeTable {
        MergeTable {
            delimiter: ',',
            columns: vec!["id".into(), "name".into(), "notes".into()],
            headers: vec![
                "id".into(),
                "name".into(),
                "notes".into(),
                "extra1".into(),
            ],
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
            preview: Vec::new(),
            edits: Vec::new(),
            cursor: 0,
        }
    }

    #[test]
    fn test_merge_joins_adjacent_values() {
        let mut table = table(&[&["2", "Bob", "hi there", " friend"]]);
        table.merge(0, 2, 3).unwrap();
        assert_eq!(table.rows()[0], vec!["2", "Bob", "hi there, friend"]);
        assert!(table.all_fixed());
        assert_eq!(table.fixed_records(), vec!["2,Bob,hi there, friend"]);
    }

    #[test]
    fn test_merge_rejects_out_of_range() {
        let mut table = table(&[&["1", "a", "b", "c"]]);
        assert!(table.merge(1, 0, 1).is_err());
        assert!(table.merge(0, 2, 9).is_err());
        assert!(table.merge(0, 3, 3).is_err());
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut table = table(&[&["1", "a", "b", "c"]]);
        table.merge(0, 2, 3).unwrap();
        assert_eq!(table.rows()[0], vec!["1", "a", "b,c"]);

        assert!(table.undo());
        assert_eq!(table.rows()[0], vec!["1", "a", "b", "c"]);
        assert!(!table.undo());

        assert!(table.redo());
        assert_eq!(table.rows()[0], vec!["1", "a", "b,c"]);
        assert!(!table.redo());
    }

    #[test]
    fn test_new_edit_truncates_undone_future() {
        let mut table = table(&[&["1", "a", "b", "c"], &["2", "d", "e", "f"]]);
        table.merge(0, 2, 3).unwrap();
        table.merge(1, 2, 3).unwrap();
        assert!(table.undo());
        assert!(table.undo());

        table.merge(0, 1, 2).unwrap();
        assert_eq!(table.edits().len(), 1);
        assert_eq!(table.rows()[0], vec!["1", "a,b", "c"]);
        // The discarded future can no longer be redone.
        assert!(!table.redo());
    }
}
