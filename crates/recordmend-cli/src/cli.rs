//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use recordmend::TextEncoding;

/// Recordmend: repair malformed delimited text files
#[derive(Parser)]
#[command(name = "recordmend")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show progress checkpoints and extra detail
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Guess encoding, delimiter, and qualifier from a file's header
    Sniff {
        /// Path to the delimited text file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output the proposal as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a file, repair what is repairable, and classify the run
    Analyze {
        /// Path to the delimited text file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pattern a line must start with to open a new record
        #[arg(short, long)]
        pattern: String,

        /// Field delimiter (single character, or \t); sniffed when omitted
        #[arg(short, long)]
        delimiter: Option<String>,

        /// Qualifier character; sniffed when omitted
        #[arg(short, long)]
        qualifier: Option<String>,

        /// Text encoding; sniffed when omitted
        #[arg(short, long, value_enum)]
        encoding: Option<EncodingChoice>,

        /// Treat only explicitly qualified values as quoted, instead of
        /// assuming every value is qualified
        #[arg(long)]
        per_value: bool,

        /// Keep the normalized output at this path instead of discarding it
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output the result summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EncodingChoice {
    Utf8,
    Windows1252,
}

impl From<EncodingChoice> for TextEncoding {
    fn from(choice: EncodingChoice) -> Self {
        match choice {
            EncodingChoice::Utf8 => TextEncoding::Utf8,
            EncodingChoice::Windows1252 => TextEncoding::Windows1252,
        }
    }
}
