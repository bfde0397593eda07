#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Export, import, and persistence options.
pub mod config;
/// Centralized constants for the enrichment file, corpus model, and layer files.
pub mod constants;
/// Explicit corpus context and per-corpus feature-name lookup.
pub mod context;
/// Corpus provider trait, in-memory corpus, and feature layer stores.
pub mod corpus;
/// Reusable example runners shared by downstream crates.
pub mod example_apps;
/// Enrichment file writer.
pub mod export;
/// Enrichment file reader and merger.
pub mod import;
/// Metadata keys and helpers.
pub mod metadata;
/// Validation and saving of imported mappings as feature layers.
pub mod persist;
/// Stage-checked export/import/persist session.
pub mod roundtrip;
/// Object selection by type, features, and scope.
pub mod select;
/// Exploratory corpus statistics.
pub mod stats;
/// Filesystem helpers for layer discovery and atomic writes.
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Text normalization helpers.
pub mod utils;

mod errors;

pub use config::{EnrichConfig, ExportOptions, ImportPolicy, PersistOptions};
pub use context::{CorpusContext, FeatureNameTable};
pub use corpus::{
    CorpusBuilder, CorpusProvider, CorpusSnapshot, DirLayerStore, FeatureLayer, FeatureMeta,
    InMemoryCorpus, InMemoryLayerStore, LayerStore, SectionRef, ValueType,
};
pub use errors::EnrichError;
pub use export::{EnrichmentRecord, ExportSummary, export_selection};
pub use import::{EnrichmentMapping, ImportReport, SkippedRow, import_enrichment};
pub use persist::{PersistReport, persist_feature};
pub use roundtrip::{EnrichmentSession, EnrichmentStage};
pub use select::{ObjectPredicate, Scope, SelectionSet, select};
pub use types::{
    BookName, CorpusKind, FeatureConcept, FeatureName, FeatureValue, FormatName, LocationLabel,
    NodeId, ObjectType,
};
