//! Explicit corpus context.
//!
//! Operations that work across several corpora receive a `CorpusContext`
//! instead of consulting a process-wide "active corpus". Feature names that
//! differ per corpus (Hebrew `gn` versus Greek `Gender`) are resolved through a
//! `FeatureNameTable` at call time.

use indexmap::IndexMap;

use crate::corpus::CorpusProvider;
use crate::errors::EnrichError;
use crate::types::{CorpusKind, FeatureConcept, FeatureName};

/// Lookup table `concept -> corpus kind -> feature name`.
#[derive(Clone, Debug, Default)]
pub struct FeatureNameTable {
    concepts: IndexMap<FeatureConcept, IndexMap<CorpusKind, FeatureName>>,
}

impl FeatureNameTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `feature` as the name of `concept` in corpora of `kind`.
    pub fn with_alias(
        mut self,
        concept: impl Into<FeatureConcept>,
        kind: impl Into<CorpusKind>,
        feature: impl Into<FeatureName>,
    ) -> Self {
        self.concepts
            .entry(concept.into())
            .or_default()
            .insert(kind.into(), feature.into());
        self
    }

    /// Feature name for `concept` in corpora of `kind`.
    pub fn resolve(&self, concept: &str, kind: &str) -> Result<&str, EnrichError> {
        self.concepts
            .get(concept)
            .and_then(|kinds| kinds.get(kind))
            .map(String::as_str)
            .ok_or_else(|| EnrichError::UnknownFeatureAlias {
                concept: concept.to_string(),
                kind: kind.to_string(),
            })
    }

    /// Registered concepts, in registration order.
    pub fn concepts(&self) -> impl Iterator<Item = &str> {
        self.concepts.keys().map(String::as_str)
    }
}

/// A corpus together with its kind and the feature-name lookup to use with it.
#[derive(Clone, Copy)]
pub struct CorpusContext<'a> {
    /// Corpus kind used for alias resolution (e.g., `greek`).
    pub kind: &'a str,
    /// The corpus being queried.
    pub corpus: &'a dyn CorpusProvider,
    /// Concept-to-feature lookup.
    pub features: &'a FeatureNameTable,
}

impl<'a> CorpusContext<'a> {
    /// Bundle a corpus with its kind and lookup table.
    pub fn new(
        kind: &'a str,
        corpus: &'a dyn CorpusProvider,
        features: &'a FeatureNameTable,
    ) -> Self {
        Self {
            kind,
            corpus,
            features,
        }
    }

    /// Feature name for `concept` in this context.
    ///
    /// Fails with `UnknownFeatureAlias` when the table has no entry, and with
    /// `FeatureNotLoaded` when the resolved feature is not loaded.
    pub fn feature_for(&self, concept: &str) -> Result<&'a str, EnrichError> {
        let feature = self.features.resolve(concept, self.kind)?;
        if !self.corpus.has_feature(feature) {
            return Err(EnrichError::FeatureNotLoaded {
                corpus_id: self.corpus.id().to_string(),
                feature: feature.to_string(),
            });
        }
        Ok(feature)
    }
}
