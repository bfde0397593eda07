use std::fs;

use fabric_enrich::{EnrichError, ImportPolicy, import_enrichment};
use tempfile::tempdir;

const HEADER: &str = "location\tidentifier\trendered_text\tannotation_value\tcontext_text";

fn write_file(dir: &std::path::Path, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.join("annotated.tsv");
    let mut body = String::from(HEADER);
    body.push('\n');
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn one_corrupt_row_among_valid_rows_is_isolated() {
    let temp = tempdir().unwrap();
    let valid = (1..=6).map(|idx| format!("Jude 1:{idx}\t{}\ttext\tplural\tctx", 100 + idx));
    let mut rows: Vec<String> = valid.collect();
    rows.insert(3, "Jude 1:9\t10x\ttext\tplural\tctx".to_string());
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    let path = write_file(temp.path(), &rows);

    let report = import_enrichment(&path, ImportPolicy::SkipAndWarn).unwrap();
    assert_eq!(report.mapping.len(), 6);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].line, 5);
    assert_eq!(report.rows_read, 7);
}

#[test]
fn strict_policy_names_file_and_line() {
    let temp = tempdir().unwrap();
    let path = write_file(temp.path(), &["Jude 1:1\t101\ttext\tplural\tctx", "Jude 1:2\t102"]);

    let err = import_enrichment(&path, ImportPolicy::Strict).unwrap_err();
    match &err {
        EnrichError::ImportParse { path: reported, line, .. } => {
            assert_eq!(reported, &path);
            assert_eq!(*line, 3);
        }
        other => panic!("expected ImportParse, got {other:?}"),
    }
    assert!(err.to_string().contains("annotated.tsv:3"));
}

#[test]
fn semicolon_files_do_not_silently_import() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("semicolon.csv");
    fs::write(
        &path,
        "location;identifier;rendered_text;annotation_value;context_text\nJude 1:1;101;text;plural;ctx\n",
    )
    .unwrap();

    let report = import_enrichment(&path, ImportPolicy::SkipAndWarn).unwrap();
    assert!(report.mapping.is_empty());
    assert_eq!(
        report.skipped.iter().map(|row| row.line).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert!(matches!(
        import_enrichment(&path, ImportPolicy::Strict),
        Err(EnrichError::ImportParse { line: 1, .. })
    ));
}

#[test]
fn dropped_header_row_does_not_lose_the_first_annotation() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("no-header.tsv");
    fs::write(
        &path,
        "Jude 1:1\t21\ttext\tplural\tctx\nJude 1:1\t22\ttext\tsingular\tctx\n",
    )
    .unwrap();

    let report = import_enrichment(&path, ImportPolicy::Strict).unwrap();
    assert_eq!(report.mapping.get(&21).map(String::as_str), Some("plural"));
    assert_eq!(report.mapping.get(&22).map(String::as_str), Some("singular"));
    assert_eq!(report.rows_read, 2);
}

#[test]
fn quoted_cells_from_spreadsheets_are_unquoted() {
    let temp = tempdir().unwrap();
    let row = "\"Jude 1:1\"\t\"101\"\t\"a \"\"quoted\"\" word\"\t\"plural\"\t\"\"";
    let path = write_file(temp.path(), &[row]);
    let report = import_enrichment(&path, ImportPolicy::Strict).unwrap();
    assert_eq!(report.mapping.get(&101).map(String::as_str), Some("plural"));
}
