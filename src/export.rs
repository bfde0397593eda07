use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ExportOptions;
use crate::constants::enrichment::{BLANK_ANNOTATION, DELIMITER, HEADER};
use crate::corpus::CorpusProvider;
use crate::errors::EnrichError;
use crate::select::SelectionSet;
use crate::types::{LocationLabel, NodeId};
use crate::utils::normalize_inline_whitespace;

/// One exportable row: a single object awaiting annotation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    /// Location label (e.g., `Jude 1:3`); empty if the node has no section.
    pub location: LocationLabel,
    /// Node identifier.
    pub node: NodeId,
    /// Rendered object text.
    pub text: String,
    /// Annotation value; blank on export.
    pub annotation: String,
    /// Rendered text of the enclosing context unit; empty if none.
    pub context: String,
}

impl EnrichmentRecord {
    fn fields(&self) -> [String; 5] {
        [
            self.location.clone(),
            self.node.to_string(),
            self.text.clone(),
            self.annotation.clone(),
            self.context.clone(),
        ]
    }
}

/// Outcome of writing an enrichment file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Destination file.
    pub path: PathBuf,
    /// Data rows written (header excluded).
    pub rows: usize,
}

/// Resolve enrichment records for every selected node, in selection order.
pub fn build_records(
    corpus: &dyn CorpusProvider,
    selection: &SelectionSet,
    options: &ExportOptions,
) -> Result<Vec<EnrichmentRecord>, EnrichError> {
    let mut records = Vec::with_capacity(selection.len());
    for node in selection.iter() {
        let text = corpus.render_text(&[node], &options.text_format)?;
        let context = match corpus.ancestors(node, &options.context_type).first() {
            Some(unit) => corpus.render_text(&[*unit], &options.text_format)?,
            None => String::new(),
        };
        records.push(EnrichmentRecord {
            location: corpus.location_label(node).unwrap_or_default(),
            node,
            text: normalize_inline_whitespace(text),
            annotation: BLANK_ANNOTATION.to_string(),
            context: normalize_inline_whitespace(context),
        });
    }
    Ok(records)
}

/// Write the header and `records` to `writer` using the fixed delimiter.
pub fn write_records<W: Write>(writer: W, records: &[EnrichmentRecord]) -> io::Result<()> {
    let mut csv = WriterBuilder::new()
        .delimiter(DELIMITER)
        .quote_style(QuoteStyle::Necessary)
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(HEADER).map_err(io::Error::other)?;
    for record in records {
        csv.write_record(record.fields()).map_err(io::Error::other)?;
    }
    csv.flush()
}

/// Create or overwrite `path` with the header and `records`.
pub fn write_enrichment_file(
    path: &Path,
    records: &[EnrichmentRecord],
) -> Result<ExportSummary, EnrichError> {
    let write_failed = |source: io::Error| EnrichError::ExportWrite {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_failed)?;
    let mut writer = BufWriter::new(file);
    write_records(&mut writer, records).map_err(write_failed)?;
    writer.flush().map_err(write_failed)?;
    Ok(ExportSummary {
        path: path.to_path_buf(),
        rows: records.len(),
    })
}

/// Build records for `selection` and write them to `path`.
///
/// Re-running with the same selection and corpus produces identical bytes.
pub fn export_selection(
    corpus: &dyn CorpusProvider,
    selection: &SelectionSet,
    options: &ExportOptions,
    path: &Path,
) -> Result<ExportSummary, EnrichError> {
    let records = build_records(corpus, selection, options)?;
    let summary = write_enrichment_file(path, &records)?;
    info!(
        corpus = %corpus.id(),
        path = %path.display(),
        rows = summary.rows,
        "exported enrichment file"
    );
    Ok(summary)
}
