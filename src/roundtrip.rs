//! Stateful export → annotate → import → persist workflow.
//!
//! An `EnrichmentSession` owns one selection and walks it through the
//! stages in order. Out-of-order calls fail with `InvalidTransition`
//! instead of silently working on stale files.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EnrichConfig;
use crate::corpus::{CorpusProvider, FeatureMeta, LayerStore};
use crate::errors::EnrichError;
use crate::export::{ExportSummary, export_selection};
use crate::import::{EnrichmentMapping, ImportReport, import_enrichment};
use crate::persist::{PersistReport, persist_feature};
use crate::select::{ObjectPredicate, Scope, SelectionSet, select};

/// Where a session is in the round trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentStage {
    /// Objects chosen; nothing written yet.
    Selected,
    /// Enrichment file written and awaiting annotation.
    Exported,
    /// Annotations read back into a mapping.
    Imported,
    /// Mapping saved as a feature layer.
    Persisted,
}

impl EnrichmentStage {
    /// Lowercase stage name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Selected => "selected",
            Self::Exported => "exported",
            Self::Imported => "imported",
            Self::Persisted => "persisted",
        }
    }
}

impl fmt::Display for EnrichmentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selection travelling through export, import, and persistence.
pub struct EnrichmentSession<'a> {
    corpus: &'a dyn CorpusProvider,
    config: EnrichConfig,
    selection: SelectionSet,
    stage: EnrichmentStage,
    export_path: Option<PathBuf>,
    report: Option<ImportReport>,
}

impl<'a> EnrichmentSession<'a> {
    /// Run `select` and start a session on the result.
    pub fn select(
        corpus: &'a dyn CorpusProvider,
        predicate: &ObjectPredicate,
        scope: &Scope,
        config: EnrichConfig,
    ) -> Result<Self, EnrichError> {
        let selection = select(corpus, predicate, scope)?;
        Ok(Self::from_selection(corpus, selection, config))
    }

    /// Start a session on an existing selection.
    pub fn from_selection(
        corpus: &'a dyn CorpusProvider,
        selection: SelectionSet,
        config: EnrichConfig,
    ) -> Self {
        info!(
            corpus = %corpus.id(),
            otype = %selection.otype,
            nodes = selection.len(),
            "enrichment session started"
        );
        Self {
            corpus,
            config,
            selection,
            stage: EnrichmentStage::Selected,
            export_path: None,
            report: None,
        }
    }

    /// Current stage.
    pub fn stage(&self) -> EnrichmentStage {
        self.stage
    }

    /// The session's selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Path of the last export, if any.
    pub fn export_path(&self) -> Option<&Path> {
        self.export_path.as_deref()
    }

    /// Report of the last import, if any.
    pub fn import_report(&self) -> Option<&ImportReport> {
        self.report.as_ref()
    }

    /// Mapping of the last import, if any.
    pub fn mapping(&self) -> Option<&EnrichmentMapping> {
        self.report.as_ref().map(|report| &report.mapping)
    }

    /// Write the enrichment file for the selection.
    ///
    /// Allowed from `Selected` and `Exported`. Exporting again overwrites the
    /// file, losing any annotations already entered in it.
    pub fn export(&mut self, path: impl AsRef<Path>) -> Result<ExportSummary, EnrichError> {
        self.require("export", &[EnrichmentStage::Selected, EnrichmentStage::Exported])?;
        let path = path.as_ref();
        if self.stage == EnrichmentStage::Exported {
            warn!(
                path = %path.display(),
                previous = ?self.export_path,
                "re-exporting; annotations entered in an overwritten file are lost"
            );
        }
        let summary = export_selection(self.corpus, &self.selection, &self.config.export, path)?;
        self.export_path = Some(path.to_path_buf());
        self.advance(EnrichmentStage::Exported);
        Ok(summary)
    }

    /// Import annotations from the exported file.
    pub fn import(&mut self) -> Result<&ImportReport, EnrichError> {
        let path = self
            .export_path
            .clone()
            .ok_or(EnrichError::InvalidTransition {
                action: "import",
                stage: self.stage,
            })?;
        self.import_from(&path)
    }

    /// Import annotations from `path` (for a copy saved under another name).
    ///
    /// Allowed from `Exported` and `Imported`; a re-import replaces the
    /// previous mapping.
    pub fn import_from(&mut self, path: impl AsRef<Path>) -> Result<&ImportReport, EnrichError> {
        self.require("import", &[EnrichmentStage::Exported, EnrichmentStage::Imported])?;
        let report = import_enrichment(path.as_ref(), self.config.import_policy)?;
        self.advance(EnrichmentStage::Imported);
        Ok(self.report.insert(report))
    }

    /// Persist the imported mapping as feature `name`.
    pub fn persist(
        &mut self,
        store: &dyn LayerStore,
        name: &str,
        meta: FeatureMeta,
    ) -> Result<PersistReport, EnrichError> {
        self.require("persist", &[EnrichmentStage::Imported])?;
        let Some(report) = self.report.as_ref() else {
            return Err(EnrichError::InvalidTransition {
                action: "persist",
                stage: self.stage,
            });
        };
        let persisted = persist_feature(
            self.corpus,
            store,
            name,
            &report.mapping,
            meta,
            &self.config.persist,
        )?;
        self.advance(EnrichmentStage::Persisted);
        Ok(persisted)
    }

    fn require(
        &self,
        action: &'static str,
        allowed: &[EnrichmentStage],
    ) -> Result<(), EnrichError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(EnrichError::InvalidTransition {
                action,
                stage: self.stage,
            })
        }
    }

    fn advance(&mut self, next: EnrichmentStage) {
        info!(
            from = %self.stage,
            to = %next,
            corpus = %self.corpus.id(),
            "enrichment stage changed"
        );
        self.stage = next;
    }
}
