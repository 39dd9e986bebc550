//! Recordmend CLI - repair malformed delimited text files.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sniff { file, json } => commands::sniff::run(file, json, cli.verbose),

        Commands::Analyze {
            file,
            pattern,
            delimiter,
            qualifier,
            encoding,
            per_value,
            output,
            json,
        } => commands::analyze::run(
            file,
            pattern,
            delimiter,
            qualifier,
            encoding,
            per_value,
            output,
            json,
            cli.verbose,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
