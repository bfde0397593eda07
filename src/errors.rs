use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::roundtrip::EnrichmentStage;
use crate::types::{CorpusKind, FeatureName, NodeId};

/// Error type for corpus access, enrichment file IO, and layer persistence.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("corpus '{corpus_id}' has no loaded feature '{feature}'")]
    FeatureNotLoaded {
        corpus_id: String,
        feature: FeatureName,
    },
    #[error("corpus '{corpus_id}' has no text format '{format}'")]
    UnknownFormat { corpus_id: String, format: String },
    #[error("corpus '{corpus_id}' has no section '{section}'")]
    UnknownSection { corpus_id: String, section: String },
    #[error("no feature registered for concept '{concept}' in corpus kind '{kind}'")]
    UnknownFeatureAlias { concept: String, kind: CorpusKind },
    #[error("failed to write enrichment file '{}': {source}", .path.display())]
    ExportWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read enrichment file '{}': {source}", .path.display())]
    ImportRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: {reason}", .path.display())]
    ImportParse {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("feature layer '{feature}' already exists in {location}; pass overwrite to replace it")]
    PersistenceCollision {
        feature: FeatureName,
        location: String,
    },
    #[error(
        "feature '{feature}' references {count} node(s) missing from corpus '{corpus_id}' (first: {sample:?})"
    )]
    IdentifierMismatch {
        feature: FeatureName,
        corpus_id: String,
        count: usize,
        sample: Vec<NodeId>,
    },
    #[error("feature layer '{feature}' not found in {location}")]
    LayerNotFound {
        feature: FeatureName,
        location: String,
    },
    #[error("layer store failure: {0}")]
    LayerStore(String),
    #[error("invalid feature name '{0}': use ASCII letters, digits, '_', '.' or '-', and not 'otype'")]
    InvalidFeatureName(String),
    #[error("feature '{feature}' declares valueType={value_type} but node {node} has value '{value}'")]
    InvalidValue {
        feature: FeatureName,
        value_type: String,
        node: NodeId,
        value: String,
    },
    #[error("layer file '{}' is malformed at line {line}: {reason}", .path.display())]
    LayerFormat {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("failed to access layer file '{}': {source}", .path.display())]
    LayerIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read corpus snapshot '{}': {source}", .path.display())]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corpus snapshot '{}' is not valid JSON: {source}", .path.display())]
    SnapshotParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot {action} while the enrichment is {stage}")]
    InvalidTransition {
        action: &'static str,
        stage: EnrichmentStage,
    },
    #[error("corpus '{corpus_id}' is inconsistent: {details}")]
    CorpusInconsistent { corpus_id: String, details: String },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
