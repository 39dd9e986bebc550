//! CLI command implementations.

pub mod analyze;
pub mod sniff;

use colored::Colorize;
use recordmend::ProgressSink;

/// Progress sink that prints checkpoints to stderr when verbose.
pub struct ConsoleProgress {
    verbose: bool,
}

impl ConsoleProgress {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressSink for ConsoleProgress {
    fn emit(&self, label: &str) {
        if self.verbose {
            eprintln!("{} {}", "->".dimmed(), label.dimmed());
        }
    }
}

/// Render a delimiter for display, keeping tabs visible.
pub fn show_char(c: char) -> String {
    match c {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
