//! Analyze command - run a full repair pass and report the outcome.

use std::path::PathBuf;

use colored::Colorize;
use recordmend::{Analyzer, CancelToken, FileConfig, MergeTable, Outcome, TextEncoding, sniff};

use super::{ConsoleProgress, show_char};
use crate::cli::EncodingChoice;

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: PathBuf,
    pattern: String,
    delimiter: Option<String>,
    qualifier: Option<String>,
    encoding: Option<EncodingChoice>,
    per_value: bool,
    output: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let progress = ConsoleProgress::new(verbose);

    // Sniff to fill in whatever the user did not specify.
    let sniffed = if delimiter.is_none() || qualifier.is_none() || encoding.is_none() {
        Some(sniff(&file, &progress)?)
    } else {
        None
    };

    let delimiter = delimiter
        .or_else(|| sniffed.as_ref().map(|s| s.delimiter.to_string()))
        .unwrap_or_default();
    let qualifier = qualifier
        .or_else(|| {
            sniffed
                .as_ref()
                .map(|s| s.qualifier.map(String::from).unwrap_or_default())
        })
        .unwrap_or_default();
    let encoding: TextEncoding = match encoding {
        Some(choice) => choice.into(),
        None => sniffed
            .as_ref()
            .map(|s| s.encoding)
            .unwrap_or(TextEncoding::Utf8),
    };

    let config = FileConfig::build(&pattern, &delimiter, &qualifier, encoding)?
        .with_all_qualified(!per_value);

    let token = CancelToken::new();
    let handle = token.clone();
    ctrlc::set_handler(move || handle.cancel())?;

    println!(
        "{} {}",
        "Analyzing".cyan().bold(),
        file.display().to_string().white()
    );

    let analyzer = Analyzer::new(config, &file)?;
    let result = analyzer.analyze(&progress, &token)?;

    if json {
        let summary = serde_json::json!({
            "outcome": result.outcome,
            "code": result.outcome.code(),
            "message": result.message,
            "delimiter": show_char(result.delimiter),
            "columns": result.columns,
            "overflow_lines": result.overflow_lines,
            "bad_delimiters": result.bad_delimiters,
            "bad_escapes": result.bad_escapes,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(&result, verbose)?;
    }

    match output {
        Some(dest) => {
            let path = result.persist_output(&dest)?;
            if !json {
                println!(
                    "Normalized output written to {}",
                    path.display().to_string().white().bold()
                );
            }
        }
        None => {
            // Dropping the result deletes the temp artifact.
            drop(result);
        }
    }

    Ok(())
}

fn print_report(
    result: &recordmend::AnalysisResult,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let code = result.outcome.code();
    let code_str = format!("outcome {}", code);
    let headline = if code > 0 {
        code_str.green().bold()
    } else if result.outcome == Outcome::EscapesRepaired {
        code_str.yellow().bold()
    } else {
        code_str.red().bold()
    };

    println!();
    println!("{}: {}", headline, result.message);
    println!(
        "Columns ({}): {}",
        result.columns.len(),
        result.columns.join(", ")
    );

    if !result.overflow_lines.is_empty() {
        println!(
            "Folded {} overflow line(s): {}",
            result.overflow_lines.len().to_string().yellow(),
            result
                .overflow_lines
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if !result.bad_delimiters.is_empty() {
        println!(
            "{} record(s) with improper delimiter counts",
            result.bad_delimiters.len().to_string().red()
        );
        if verbose {
            for bad in &result.bad_delimiters {
                println!(
                    "  [{:?}] {} delimiters, expected {}: {}",
                    bad.class, bad.count, bad.expected, bad.record
                );
            }
        }
    }

    if !result.bad_escapes.is_empty() {
        println!(
            "{} record(s) with unescaped qualifiers",
            result.bad_escapes.len().to_string().yellow()
        );
        if verbose {
            for bad in &result.bad_escapes {
                println!("  original: {}", bad.record);
                println!("  repaired: {}", bad.fixed_record());
            }
        }
    }

    if result.outcome == Outcome::MergeRepairable && verbose {
        let table = MergeTable::from_result(result)?;
        println!();
        println!("{}", "Merge table".cyan().bold());
        println!("  {}", table.headers().join(" | "));
        for row in table.preview_rows() {
            println!("  {}", row.join(" | ").dimmed());
        }
        for row in table.rows() {
            println!("  {}", row.join(" | ").red());
        }
    }

    Ok(())
}
