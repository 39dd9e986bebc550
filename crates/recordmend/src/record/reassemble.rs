//! Logical-record reassembly from the physical-line stream.
//!
//! Exports whose records wrap across physical lines do not fit the "one
//! record per line" model. The reassembler walks the body lines once and
//! decides, per line, whether it starts a new record or continues the
//! previous one, using the record-start pattern, open-qualifier state, a
//! list-item shape heuristic, and the header's delimiter count.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::FileConfig;

/// Continuation lines joined into a record keep this marker in place of
/// the newline, so the fold points stay distinguishable from real content.
pub const CONTINUATION_MARKER: char = '\r';

/// A short alphanumeric marker followed by `)` or `.` and a space: the
/// shape of a list item inside a multi-line comment field.
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+[).] ").expect("static pattern"));

/// One reassembled record: the raw pre-repair text plus the physical line
/// numbers that were folded into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalRecord {
    pub text: String,
    /// 1-based physical line numbers (the header is line 1) of the lines
    /// appended as continuations.
    pub overflow_lines: Vec<usize>,
}

/// Streaming producer of [`LogicalRecord`]s. Single pass; restart by
/// constructing a new reassembler. The accumulating buffer and overflow
/// list are owned here and discarded when the pass ends.
pub struct RecordReassembler<'a> {
    config: &'a FileConfig,
    header_delimiter_count: usize,
    lines: std::iter::Enumerate<std::slice::Iter<'a, String>>,
    buffer: String,
    buffer_overflow: Vec<usize>,
    finished: bool,
}

impl<'a> RecordReassembler<'a> {
    /// Build a reassembler over the body lines (everything after the
    /// header, already decoded and stripped of line terminators).
    pub fn new(
        config: &'a FileConfig,
        body_lines: &'a [String],
        header_delimiter_count: usize,
    ) -> Self {
        Self {
            config,
            header_delimiter_count,
            lines: body_lines.iter().enumerate(),
            buffer: String::new(),
            buffer_overflow: Vec::new(),
            finished: false,
        }
    }

    fn is_record_start(&self, line: &str) -> bool {
        self.config
            .record_start
            .find(line)
            .is_some_and(|m| m.start() == 0)
    }

    /// Whether the buffer holds an opened qualified value that has not yet
    /// closed: it does not end with the qualifier, and its last start
    /// boundary comes after its last end boundary.
    fn has_open_qualified_value(&self) -> bool {
        let Some(q) = self.config.qualifier else {
            return false;
        };
        if self.buffer.ends_with(q) {
            return false;
        }
        let start_pat = self.config.start_pattern().expect("qualifier configured");
        let end_pat = self.config.end_pattern().expect("qualifier configured");
        match (self.buffer.rfind(&start_pat), self.buffer.rfind(&end_pat)) {
            (Some(last_start), Some(last_end)) => last_start > last_end,
            (Some(_), None) => true,
            _ => false,
        }
    }

    fn append_continuation(&mut self, line: &str, physical_line: usize) {
        self.buffer.push(CONTINUATION_MARKER);
        self.buffer.push_str(line);
        self.buffer_overflow.push(physical_line);
    }

    /// Swap the buffer out as a finished record and restart it with `line`.
    fn flush_and_restart(&mut self, line: &str) -> LogicalRecord {
        let record = LogicalRecord {
            text: std::mem::take(&mut self.buffer),
            overflow_lines: std::mem::take(&mut self.buffer_overflow),
        };
        self.buffer.push_str(line);
        record
    }
}

impl Iterator for RecordReassembler<'_> {
    type Item = LogicalRecord;

    fn next(&mut self) -> Option<LogicalRecord> {
        if self.finished {
            return None;
        }

        while let Some((i, line)) = self.lines.next() {
            // Header is physical line 1, first body line is line 2.
            let physical_line = i + 2;

            if self.is_record_start(line) {
                if self.buffer.is_empty() {
                    self.buffer.push_str(line);
                    continue;
                }
                return Some(self.flush_and_restart(line));
            }

            if line.is_empty() {
                self.append_continuation(line, physical_line);
                continue;
            }

            if self.has_open_qualified_value() {
                self.append_continuation(line, physical_line);
                continue;
            }

            if LIST_ITEM.is_match(line) {
                self.append_continuation(line, physical_line);
            } else if line.matches(self.config.delimiter).count() != self.header_delimiter_count {
                self.append_continuation(line, physical_line);
            } else if self.buffer.is_empty() {
                self.buffer.push_str(line);
            } else {
                return Some(self.flush_and_restart(line));
            }
        }

        self.finished = true;
        if self.buffer.is_empty() {
            return None;
        }
        Some(LogicalRecord {
            text: std::mem::take(&mut self.buffer),
            overflow_lines: std::mem::take(&mut self.buffer_overflow),
        })
    }
}
