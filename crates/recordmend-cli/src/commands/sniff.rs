//! Sniff command - propose encoding, delimiter, and qualifier for a file.

use std::path::PathBuf;

use colored::Colorize;
use recordmend::sniff;

use super::{ConsoleProgress, show_char};

pub fn run(file: PathBuf, json: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let progress = ConsoleProgress::new(verbose);
    let outcome = sniff(&file, &progress)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Sniffed".cyan().bold(),
        file.display().to_string().white()
    );
    println!("  delimiter: {}", show_char(outcome.delimiter).white().bold());
    println!(
        "  qualifier: {}",
        outcome
            .qualifier
            .map(|q| q.to_string())
            .unwrap_or_else(|| "(none)".to_string())
            .white()
            .bold()
    );
    println!("  encoding:  {}", outcome.encoding.label().white().bold());
    println!();
    println!("This is a best-effort guess; confirm before analyzing.");

    Ok(())
}
