use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::PersistOptions;
use crate::constants::corpus::OTYPE_FEATURE;
use crate::constants::layers::MISMATCH_SAMPLE_LIMIT;
use crate::corpus::{CorpusProvider, FeatureLayer, FeatureMeta, LayerStore};
use crate::errors::EnrichError;
use crate::import::EnrichmentMapping;
use crate::types::{FeatureName, NodeId};
use crate::utils::is_valid_feature_name;

/// Outcome of a successful persist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistReport {
    /// Name of the written layer.
    pub feature: FeatureName,
    /// Nodes carrying a value.
    pub nodes: usize,
    /// Store location the layer was written to.
    pub location: String,
    /// True if an existing same-named layer was replaced.
    pub replaced: bool,
}

/// Validate `mapping` against `corpus` and save it to `store` as feature `name`.
///
/// Checks run in order: name, identifiers, values, collision. Nothing is
/// written unless all of them pass.
pub fn persist_feature(
    corpus: &dyn CorpusProvider,
    store: &dyn LayerStore,
    name: &str,
    mapping: &EnrichmentMapping,
    meta: FeatureMeta,
    options: &PersistOptions,
) -> Result<PersistReport, EnrichError> {
    if !is_valid_feature_name(name) || name == OTYPE_FEATURE {
        return Err(EnrichError::InvalidFeatureName(name.to_string()));
    }

    let missing: Vec<NodeId> = mapping
        .keys()
        .copied()
        .filter(|node| !corpus.contains(*node))
        .collect();
    if !missing.is_empty() {
        return Err(EnrichError::IdentifierMismatch {
            feature: name.to_string(),
            corpus_id: corpus.id().to_string(),
            count: missing.len(),
            sample: missing.into_iter().take(MISMATCH_SAMPLE_LIMIT).collect(),
        });
    }

    let layer = FeatureLayer::new(name, meta, mapping.clone());
    layer.validate_values()?;

    let exists = store.contains_layer(name)? || corpus.has_feature(name);
    if exists && !options.overwrite {
        return Err(EnrichError::PersistenceCollision {
            feature: name.to_string(),
            location: store.location(),
        });
    }
    if layer.is_empty() {
        warn!(feature = %name, "persisting a feature layer without values");
    }

    store.save_layer(&layer, options.overwrite)?;
    info!(
        feature = %name,
        nodes = layer.len(),
        location = %store.location(),
        replaced = exists,
        "persisted feature layer"
    );
    Ok(PersistReport {
        feature: name.to_string(),
        nodes: layer.len(),
        location: store.location(),
        replaced: exists,
    })
}
