use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ImportPolicy;
use crate::constants::enrichment::{
    COL_ANNOTATION, COL_IDENTIFIER, DELIMITER, HEADER, MIN_IMPORT_COLUMNS,
};
use crate::errors::EnrichError;
use crate::types::{FeatureValue, NodeId};

/// Node id to annotation value, ordered by node id.
pub type EnrichmentMapping = BTreeMap<NodeId, FeatureValue>;

/// A data row the importer could not use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based line number in the file.
    pub line: u64,
    /// Why the row was rejected.
    pub reason: String,
}

/// Result of importing an enrichment file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Accepted annotations.
    pub mapping: EnrichmentMapping,
    /// Malformed rows skipped under `ImportPolicy::SkipAndWarn`.
    pub skipped: Vec<SkippedRow>,
    /// Data rows seen (header excluded).
    pub rows_read: usize,
    /// Rows left unannotated.
    pub blank_rows: usize,
}

enum RowOutcome {
    Accepted,
    Blank,
}

/// Import an enrichment file from `path`.
///
/// Unreadable files fail with `ImportRead`. Malformed rows are handled
/// according to `policy`.
pub fn import_enrichment(path: &Path, policy: ImportPolicy) -> Result<ImportReport, EnrichError> {
    let file = File::open(path).map_err(|source| EnrichError::ImportRead {
        path: path.to_path_buf(),
        source,
    })?;
    let report = read_enrichment(file, path, policy)?;
    info!(
        path = %path.display(),
        annotated = report.mapping.len(),
        blank = report.blank_rows,
        skipped = report.skipped.len(),
        "imported enrichment file"
    );
    Ok(report)
}

/// Import enrichment rows from any reader; `path` labels diagnostics.
pub fn read_enrichment<R: Read>(
    reader: R,
    path: &Path,
    policy: ImportPolicy,
) -> Result<ImportReport, EnrichError> {
    let mut csv = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut report = ImportReport::default();
    let mut records = csv.records();
    match records.next() {
        Some(Ok(first)) => match classify_first_row(&first) {
            FirstRow::Header => {}
            FirstRow::Data => {
                warn!(
                    path = %path.display(),
                    "enrichment file has no header row; reading line 1 as data"
                );
                report.rows_read += 1;
                take_row(path, policy, &mut report, &first, 1)?;
            }
            FirstRow::Unrecognized => {
                let reason = format!(
                    "unrecognized header {:?}, expected {:?}",
                    first.iter().collect::<Vec<_>>(),
                    HEADER
                );
                reject(path, policy, &mut report, 1, reason)?;
            }
        },
        Some(Err(err)) => {
            let reason = format!("unreadable header: {err}");
            reject(path, policy, &mut report, 1, reason)?;
        }
        None => warn!(path = %path.display(), "enrichment file is empty"),
    }

    let mut last_line = 1;
    for result in records {
        report.rows_read += 1;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                let line = err
                    .position()
                    .map(|pos| pos.line())
                    .unwrap_or(last_line + 1);
                last_line = line;
                reject(path, policy, &mut report, line, format!("unreadable record: {err}"))?;
                continue;
            }
        };
        let line = record
            .position()
            .map(|pos| pos.line())
            .unwrap_or(last_line + 1);
        last_line = line;
        take_row(path, policy, &mut report, &record, line)?;
    }
    Ok(report)
}

enum FirstRow {
    Header,
    Data,
    Unrecognized,
}

fn classify_first_row(record: &StringRecord) -> FirstRow {
    let is_header = record.len() >= MIN_IMPORT_COLUMNS
        && record
            .iter()
            .zip(HEADER)
            .all(|(found, expected)| found.trim() == expected);
    if is_header {
        return FirstRow::Header;
    }
    let has_identifier = record
        .get(COL_IDENTIFIER)
        .is_some_and(|raw| raw.trim().parse::<NodeId>().is_ok());
    if has_identifier {
        FirstRow::Data
    } else {
        FirstRow::Unrecognized
    }
}

fn take_row(
    path: &Path,
    policy: ImportPolicy,
    report: &mut ImportReport,
    record: &StringRecord,
    line: u64,
) -> Result<(), EnrichError> {
    match accept_row(record, &mut report.mapping) {
        Ok(RowOutcome::Accepted) => Ok(()),
        Ok(RowOutcome::Blank) => {
            report.blank_rows += 1;
            Ok(())
        }
        Err(reason) => reject(path, policy, report, line, reason),
    }
}

fn accept_row(
    record: &StringRecord,
    mapping: &mut EnrichmentMapping,
) -> Result<RowOutcome, String> {
    if record.len() < MIN_IMPORT_COLUMNS {
        return Err(format!(
            "expected at least {MIN_IMPORT_COLUMNS} columns, found {}",
            record.len()
        ));
    }
    let annotation = record.get(COL_ANNOTATION).unwrap_or_default().trim();
    if annotation.is_empty() {
        return Ok(RowOutcome::Blank);
    }
    let raw_id = record.get(COL_IDENTIFIER).unwrap_or_default().trim();
    let node: NodeId = raw_id
        .parse()
        .map_err(|_| format!("invalid identifier '{raw_id}'"))?;

    match mapping.entry(node) {
        Entry::Vacant(slot) => {
            slot.insert(annotation.to_string());
        }
        Entry::Occupied(existing) if existing.get() == annotation => {}
        Entry::Occupied(existing) => {
            return Err(format!(
                "identifier {node} already annotated as '{}', refusing '{annotation}'",
                existing.get()
            ));
        }
    }
    Ok(RowOutcome::Accepted)
}

fn reject(
    path: &Path,
    policy: ImportPolicy,
    report: &mut ImportReport,
    line: u64,
    reason: String,
) -> Result<(), EnrichError> {
    match policy {
        ImportPolicy::Strict => Err(EnrichError::ImportParse {
            path: PathBuf::from(path),
            line,
            reason,
        }),
        ImportPolicy::SkipAndWarn => {
            warn!(
                path = %path.display(),
                line,
                reason = %reason,
                "skipping malformed enrichment row"
            );
            report.skipped.push(SkippedRow { line, reason });
            Ok(())
        }
    }
}
