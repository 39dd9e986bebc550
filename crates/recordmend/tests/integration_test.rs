//! End-to-end analysis scenarios over real temp files, covering every row
//! of the outcome decision table.

use std::io::Write;

use tempfile::NamedTempFile;

use recordmend::{
    Analyzer, CancelToken, DelimiterClass, FileConfig, MergeTable, NullProgress, Outcome,
    ProgressSink, RecordmendError, TextEncoding, sniff,
};

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn analyze(config: FileConfig, content: &str) -> recordmend::AnalysisResult {
    let file = write_file(content);
    let analyzer = Analyzer::new(config, file.path()).unwrap();
    analyzer.analyze(&NullProgress, &CancelToken::new()).unwrap()
}

fn csv_config(qualifier: &str) -> FileConfig {
    FileConfig::build(r"^\d+,", ",", qualifier, TextEncoding::Utf8).unwrap()
}

#[test]
fn test_clean_file_needs_no_fix() {
    let result = analyze(
        csv_config(""),
        "id,name,notes\n1,Alice,hello\n2,Bob,there\n",
    );
    assert_eq!(result.outcome, Outcome::Clean);
    assert_eq!(result.outcome.code(), 1);
    assert_eq!(result.columns, vec!["id", "name", "notes"]);
    assert!(result.bad_delimiters.is_empty());
    assert!(result.bad_escapes.is_empty());
    assert!(result.overflow_lines.is_empty());

    let output = std::fs::read_to_string(result.output_path()).unwrap();
    assert_eq!(output, "id,name,notes\n1,Alice,hello\n2,Bob,there\n");
}

#[test]
fn test_too_many_delimiters_is_merge_repairable() {
    // Second data line has 3 commas against the header's 2.
    let result = analyze(
        csv_config(""),
        "id,name,notes\n1,Alice,hello\n2,Bob,hi there, friend\n",
    );
    assert_eq!(result.outcome, Outcome::MergeRepairable);
    assert_eq!(result.outcome.code(), -3);
    assert_eq!(result.bad_delimiters.len(), 1);

    let bad = &result.bad_delimiters[0];
    assert_eq!(bad.record, "2,Bob,hi there, friend");
    assert_eq!(bad.count, 3);
    assert_eq!(bad.expected, 2);
    assert_eq!(bad.class, DelimiterClass::TooMany);

    // The bad record is not written to the normalized output.
    let output = std::fs::read_to_string(result.output_path()).unwrap();
    assert_eq!(output, "id,name,notes\n1,Alice,hello\n");
}

#[test]
fn test_unescaped_qualifier_is_repaired() {
    let config = csv_config("\"").with_all_qualified(false);
    let result = analyze(config, "id,name\n1,\"Alice, \"Ann\"  Smith\"\n");
    assert_eq!(result.outcome, Outcome::EscapesRepaired);
    assert_eq!(result.outcome.code(), -2);
    assert_eq!(result.bad_escapes.len(), 1);

    let bad = &result.bad_escapes[0];
    assert_eq!(bad.offending_values, vec!["Alice, \"Ann\"  Smith"]);
    assert_eq!(bad.fixed_record(), "1,\"Alice, \"\"Ann\"\"  Smith\"");

    // Repaired records are appended after the clean output.
    let output = std::fs::read_to_string(result.output_path()).unwrap();
    assert_eq!(output, "id,name\n1,\"Alice, \"\"Ann\"\"  Smith\"\n");
}

#[test]
fn test_escapes_and_delimiters_together_are_unrepairable() {
    let config = csv_config("\"").with_all_qualified(false);
    let result = analyze(
        config,
        "id,name\n1,\"Ann \"B\" C\"\n2,over,split\n",
    );
    assert_eq!(result.outcome, Outcome::MixedIssues);
    assert_eq!(result.outcome.code(), -1);
    assert_eq!(result.bad_escapes.len(), 1);
    assert_eq!(result.bad_delimiters.len(), 1);
}

#[test]
fn test_too_few_delimiters_is_structure_loss() {
    let result = analyze(csv_config(""), "id,name,notes\n1,Alice\n");
    assert_eq!(result.outcome, Outcome::TooFewDelimiters);
    assert_eq!(result.outcome.code(), -4);
    assert_eq!(result.bad_delimiters[0].class, DelimiterClass::TooFew);
}

#[test]
fn test_bad_delimiters_with_qualifier_are_unrepairable() {
    let result = analyze(csv_config("\""), "id,name\n1,over,split\n");
    assert_eq!(result.outcome, Outcome::QualifiedDelimiterMismatch);
    assert_eq!(result.outcome.code(), -5);
}

#[test]
fn test_overflow_without_qualifier_is_fragile() {
    let result = analyze(csv_config(""), "id,name,notes\n1,Alice,note\n\n2,Bob,x\n");
    assert_eq!(result.outcome, Outcome::FragileOverflow);
    assert_eq!(result.outcome.code(), -6);
    assert_eq!(result.overflow_lines, vec![3]);
    assert!(result.bad_delimiters.is_empty());
}

#[test]
fn test_columns_strip_qualifier_characters() {
    let result = analyze(csv_config("\""), "\"id\",\"name\"\n1,\"Alice\"\n");
    assert_eq!(result.columns, vec!["id", "name"]);
}

#[test]
fn test_cancelled_pass_returns_cancelled_and_discards_output() {
    struct RecordingProgress(std::sync::Mutex<Vec<String>>);

    impl ProgressSink for RecordingProgress {
        fn emit(&self, label: &str) {
            self.0.lock().unwrap().push(label.to_string());
        }
    }

    let file = write_file("id,name\n1,Alice\n2,Bob\n");
    let analyzer = Analyzer::new(csv_config(""), file.path()).unwrap();

    let token = CancelToken::new();
    token.cancel();
    let progress = RecordingProgress(std::sync::Mutex::new(Vec::new()));
    let err = analyzer.analyze(&progress, &token).unwrap_err();
    assert!(matches!(err, RecordmendError::Cancelled));

    // The checkpoint labels name the artifact path; cancellation must not
    // leave that file behind.
    let labels = progress.0.lock().unwrap();
    let artifact = labels
        .iter()
        .find_map(|l| l.strip_prefix("Writing normalized output to "))
        .expect("artifact checkpoint emitted");
    assert!(!std::path::Path::new(artifact).exists());
}

#[test]
fn test_sniff_then_analyze_roundtrip() {
    let file = write_file("\"id\",\"name\",\"notes\"\n\"1\",\"Alice\",\"hi\"\n\"2\",\"Bob\",\"yo\"\n");
    let outcome = sniff(file.path(), &NullProgress).unwrap();
    assert_eq!(outcome.delimiter, ',');
    assert_eq!(outcome.qualifier, Some('"'));

    let config = outcome.to_config("^\"\\d+\"").unwrap();
    let analyzer = Analyzer::new(config, file.path()).unwrap();
    let result = analyzer.analyze(&NullProgress, &CancelToken::new()).unwrap();
    assert_eq!(result.outcome, Outcome::Clean);
}

#[test]
fn test_merge_workflow_repairs_over_split_record() {
    let result = analyze(
        csv_config(""),
        "id,name,notes\n1,Alice,hello\n2,Bob,hi there, friend\n",
    );
    let mut table = MergeTable::from_result(&result).unwrap();

    assert_eq!(
        table.headers(),
        ["id", "name", "notes", "extra1"]
    );
    assert_eq!(table.preview_rows().len(), 1);
    assert_eq!(table.preview_rows()[0], vec!["1", "Alice", "hello"]);

    assert!(!table.all_fixed());
    table.merge(0, 2, 3).unwrap();
    assert!(table.all_fixed());
    assert_eq!(table.fixed_records(), vec!["2,Bob,hi there, friend"]);
}

#[test]
fn test_merge_table_rejects_other_outcomes() {
    let result = analyze(csv_config(""), "id,name\n1,Alice\n");
    let err = MergeTable::from_result(&result).unwrap_err();
    assert!(matches!(err, RecordmendError::Merge(_)));
}

#[test]
fn test_windows_1252_body_analyzes_cleanly() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"id;name\n1;caf\xe9\n").unwrap();

    let config = FileConfig::build(r"^\d+;", ";", "", TextEncoding::Windows1252).unwrap();
    let analyzer = Analyzer::new(config, file.path()).unwrap();
    let result = analyzer.analyze(&NullProgress, &CancelToken::new()).unwrap();
    assert_eq!(result.outcome, Outcome::Clean);

    let output = std::fs::read_to_string(result.output_path()).unwrap();
    assert_eq!(output, "id;name\n1;café\n");
}

#[test]
fn test_persisted_output_survives_result_drop() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("normalized.csv");

    let result = analyze(csv_config(""), "id,name\n1,Alice\n");
    let path = result.persist_output(&dest).unwrap();
    assert_eq!(path, dest);
    assert!(dest.exists());
    assert_eq!(
        std::fs::read_to_string(&dest).unwrap(),
        "id,name\n1,Alice\n"
    );
}
