use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::RwLock;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::layers::{META_AUTHOR, META_SOURCE, META_VALUE_TYPE};
use crate::corpus::tf;
use crate::errors::EnrichError;
use crate::transport::fs::{file_mtime, list_layer_files, write_atomic};
use crate::types::{FeatureName, FeatureValue, NodeId};

/// Declared type of the values in a feature layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Free-text values.
    #[default]
    Str,
    /// Integer values (stored as decimal text).
    Int,
}

impl ValueType {
    /// Tag written into layer metadata.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "str" => Ok(Self::Str),
            "int" => Ok(Self::Int),
            other => Err(format!("unknown value type '{other}'")),
        }
    }
}

/// Metadata attached to a persisted feature layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureMeta {
    /// Declared value type.
    pub value_type: ValueType,
    /// Free-text provenance (e.g., "Semantic plurality training set").
    pub source: String,
    /// Free-text author.
    pub author: String,
    /// Any further metadata keys, kept sorted.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl FeatureMeta {
    /// Create metadata with an explicit type, provenance, and author.
    pub fn new(
        value_type: ValueType,
        source: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            value_type,
            source: source.into(),
            author: author.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Attach an extra metadata key.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// All metadata as sorted key/value pairs, named the way layer headers name them.
    pub fn entries(&self) -> BTreeMap<String, String> {
        let mut entries = self.extra.clone();
        entries.insert(
            META_VALUE_TYPE.as_str().to_string(),
            self.value_type.as_str().to_string(),
        );
        entries.insert(META_SOURCE.as_str().to_string(), self.source.clone());
        entries.insert(META_AUTHOR.as_str().to_string(), self.author.clone());
        entries
    }

    /// Rebuild metadata from header key/value pairs.
    ///
    /// A missing `valueType` defaults to `str`.
    pub fn from_entries(mut entries: BTreeMap<String, String>) -> Result<Self, String> {
        let value_type = match entries.remove(META_VALUE_TYPE.as_str()) {
            Some(tag) => tag.parse()?,
            None => ValueType::Str,
        };
        Ok(Self {
            value_type,
            source: entries.remove(META_SOURCE.as_str()).unwrap_or_default(),
            author: entries.remove(META_AUTHOR.as_str()).unwrap_or_default(),
            extra: entries,
        })
    }
}

/// A named mapping from node to value, plus metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLayer {
    /// Feature name; also the layer's file stem in directory stores.
    pub name: FeatureName,
    /// Layer metadata.
    pub meta: FeatureMeta,
    /// Values keyed by node.
    pub values: BTreeMap<NodeId, FeatureValue>,
}

impl FeatureLayer {
    /// Create a layer from a name, metadata, and values.
    pub fn new(
        name: impl Into<FeatureName>,
        meta: FeatureMeta,
        values: BTreeMap<NodeId, FeatureValue>,
    ) -> Self {
        Self {
            name: name.into(),
            meta,
            values,
        }
    }

    /// Value for `node`, if any.
    pub fn get(&self, node: NodeId) -> Option<&str> {
        self.values.get(&node).map(String::as_str)
    }

    /// Number of nodes carrying a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no node carries a value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check every value against the declared value type.
    pub fn validate_values(&self) -> Result<(), EnrichError> {
        if self.meta.value_type != ValueType::Int {
            return Ok(());
        }
        for (node, value) in &self.values {
            if value.trim().parse::<i64>().is_err() {
                return Err(EnrichError::InvalidValue {
                    feature: self.name.clone(),
                    value_type: self.meta.value_type.to_string(),
                    node: *node,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Persistence backend for feature layers.
///
/// `save_layer` must refuse to replace an existing layer unless `overwrite`
/// is set, and must leave the existing layer untouched when it refuses.
pub trait LayerStore: Send + Sync {
    /// Human-readable location used in diagnostics.
    fn location(&self) -> String;
    /// True if a layer named `name` exists.
    fn contains_layer(&self, name: &str) -> Result<bool, EnrichError>;
    /// Names of all stored layers, sorted.
    fn layer_names(&self) -> Result<Vec<FeatureName>, EnrichError>;
    /// Load the layer named `name`, if present.
    fn load_layer(&self, name: &str) -> Result<Option<FeatureLayer>, EnrichError>;
    /// Persist `layer` under its own name.
    fn save_layer(&self, layer: &FeatureLayer, overwrite: bool) -> Result<(), EnrichError>;
}

/// In-memory layer store for tests and scratch work.
#[derive(Default)]
pub struct InMemoryLayerStore {
    layers: RwLock<BTreeMap<FeatureName, FeatureLayer>>,
}

impl InMemoryLayerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayerStore for InMemoryLayerStore {
    fn location(&self) -> String {
        "in-memory layer store".to_string()
    }

    fn contains_layer(&self, name: &str) -> Result<bool, EnrichError> {
        Ok(self
            .layers
            .read()
            .map_err(|_| EnrichError::LayerStore("layer lock poisoned".into()))?
            .contains_key(name))
    }

    fn layer_names(&self) -> Result<Vec<FeatureName>, EnrichError> {
        Ok(self
            .layers
            .read()
            .map_err(|_| EnrichError::LayerStore("layer lock poisoned".into()))?
            .keys()
            .cloned()
            .collect())
    }

    fn load_layer(&self, name: &str) -> Result<Option<FeatureLayer>, EnrichError> {
        Ok(self
            .layers
            .read()
            .map_err(|_| EnrichError::LayerStore("layer lock poisoned".into()))?
            .get(name)
            .cloned())
    }

    fn save_layer(&self, layer: &FeatureLayer, overwrite: bool) -> Result<(), EnrichError> {
        let mut guard = self
            .layers
            .write()
            .map_err(|_| EnrichError::LayerStore("layer lock poisoned".into()))?;
        if !overwrite && guard.contains_key(&layer.name) {
            return Err(EnrichError::PersistenceCollision {
                feature: layer.name.clone(),
                location: self.location(),
            });
        }
        guard.insert(layer.name.clone(), layer.clone());
        Ok(())
    }
}

/// Directory-backed layer store: one `<name>.tf` file per layer.
#[derive(Clone, Debug)]
pub struct DirLayerStore {
    root: PathBuf,
}

impl DirLayerStore {
    /// Open (or create) a layer directory at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, EnrichError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| EnrichError::LayerIo {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Directory holding the layer files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path used for the layer named `name`.
    pub fn layer_path(&self, name: &str) -> PathBuf {
        self.root.join(format!(
            "{name}.{}",
            crate::constants::layers::LAYER_EXTENSION
        ))
    }
}

impl LayerStore for DirLayerStore {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn contains_layer(&self, name: &str) -> Result<bool, EnrichError> {
        Ok(self.layer_path(name).is_file())
    }

    fn layer_names(&self) -> Result<Vec<FeatureName>, EnrichError> {
        Ok(list_layer_files(&self.root)
            .iter()
            .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()))
            .map(str::to_string)
            .collect())
    }

    fn load_layer(&self, name: &str) -> Result<Option<FeatureLayer>, EnrichError> {
        let path = self.layer_path(name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(EnrichError::LayerIo { path, source }),
        };
        let layer = tf::decode_layer(&path, name, &text)?;
        debug!(
            feature = %name,
            path = %path.display(),
            nodes = layer.len(),
            modified = ?file_mtime(&path),
            "loaded feature layer"
        );
        Ok(Some(layer))
    }

    fn save_layer(&self, layer: &FeatureLayer, overwrite: bool) -> Result<(), EnrichError> {
        let path = self.layer_path(&layer.name);
        let encoded = tf::encode_layer(layer, Utc::now());
        write_atomic(&path, encoded.as_bytes(), overwrite).map_err(|err| {
            if err.kind() == io::ErrorKind::AlreadyExists {
                EnrichError::PersistenceCollision {
                    feature: layer.name.clone(),
                    location: self.location(),
                }
            } else {
                EnrichError::LayerIo {
                    path: path.clone(),
                    source: err,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sem_number(values: &[(NodeId, &str)]) -> FeatureLayer {
        FeatureLayer::new(
            "semNumber",
            FeatureMeta::new(
                ValueType::Str,
                "Semantic plurality training set",
                "J.S. Bach, Leipzig",
            ),
            values
                .iter()
                .map(|(node, value)| (*node, value.to_string()))
                .collect(),
        )
    }

    #[test]
    fn meta_entries_round_trip_through_header_pairs() {
        let meta = FeatureMeta::new(ValueType::Int, "counts", "someone").with_extra("note", "x");
        let entries = meta.entries();
        assert_eq!(entries.get("valueType").map(String::as_str), Some("int"));
        assert_eq!(FeatureMeta::from_entries(entries).unwrap(), meta);

        let mut bad = BTreeMap::new();
        bad.insert("valueType".to_string(), "float".to_string());
        assert!(FeatureMeta::from_entries(bad).is_err());
    }

    #[test]
    fn int_layers_reject_non_numeric_values() {
        let mut layer = sem_number(&[(1, "3"), (2, "-4")]);
        layer.meta.value_type = ValueType::Int;
        assert!(layer.validate_values().is_ok());
        layer.values.insert(3, "three".into());
        match layer.validate_values() {
            Err(EnrichError::InvalidValue { node, .. }) => assert_eq!(node, 3),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn in_memory_store_refuses_collisions_without_overwrite() {
        let store = InMemoryLayerStore::new();
        store.save_layer(&sem_number(&[(102, "plural")]), false).unwrap();

        let err = store
            .save_layer(&sem_number(&[(102, "singular")]), false)
            .unwrap_err();
        assert!(matches!(err, EnrichError::PersistenceCollision { .. }));
        let kept = store.load_layer("semNumber").unwrap().unwrap();
        assert_eq!(kept.get(102), Some("plural"));

        store.save_layer(&sem_number(&[(102, "singular")]), true).unwrap();
        let replaced = store.load_layer("semNumber").unwrap().unwrap();
        assert_eq!(replaced.get(102), Some("singular"));
        assert_eq!(store.layer_names().unwrap(), vec!["semNumber".to_string()]);
    }

    #[test]
    fn dir_store_persists_and_reloads_layers() {
        let temp = tempdir().unwrap();
        let store = DirLayerStore::open(temp.path().join("semantic")).unwrap();
        assert!(!store.contains_layer("semNumber").unwrap());
        assert!(store.load_layer("semNumber").unwrap().is_none());

        let layer = sem_number(&[(101, "singular"), (102, "plural"), (110, "plural")]);
        store.save_layer(&layer, false).unwrap();
        assert!(store.contains_layer("semNumber").unwrap());
        assert_eq!(store.layer_names().unwrap(), vec!["semNumber".to_string()]);

        let loaded = store.load_layer("semNumber").unwrap().unwrap();
        assert_eq!(loaded.values, layer.values);
        assert_eq!(loaded.meta.source, layer.meta.source);
        assert_eq!(loaded.meta.author, layer.meta.author);
        assert!(loaded.meta.extra.contains_key("dateWritten"));
        assert!(loaded.meta.extra.contains_key("writtenBy"));
    }

    #[test]
    fn dir_store_only_lists_layers_it_can_load() {
        let temp = tempdir().unwrap();
        let store = DirLayerStore::open(temp.path()).unwrap();
        fs::write(temp.path().join("Cat.TF"), "@node\n@valueType=str\n\nnp\n").unwrap();

        assert!(store.layer_names().unwrap().is_empty());
        store.save_layer(&sem_number(&[(1, "plural")]), false).unwrap();
        for name in store.layer_names().unwrap() {
            assert!(store.contains_layer(&name).unwrap());
            assert!(store.load_layer(&name).unwrap().is_some());
        }
    }

    #[test]
    fn dir_store_io_failures_name_the_path() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();

        let err = DirLayerStore::open(blocker.join("layers")).unwrap_err();
        assert!(matches!(err, EnrichError::LayerIo { .. }));
        assert!(err.to_string().contains("not-a-dir"), "{err}");

        let store = DirLayerStore::open(temp.path().join("layers")).unwrap();
        fs::create_dir(store.layer_path("semNumber")).unwrap();
        let err = store.load_layer("semNumber").unwrap_err();
        assert!(matches!(err, EnrichError::LayerIo { .. }));
        assert!(err.to_string().contains("semNumber.tf"), "{err}");
    }

    #[test]
    fn dir_store_collision_keeps_existing_file_bytes() {
        let temp = tempdir().unwrap();
        let store = DirLayerStore::open(temp.path()).unwrap();
        store.save_layer(&sem_number(&[(102, "plural")]), false).unwrap();
        let before = fs::read(store.layer_path("semNumber")).unwrap();

        let err = store
            .save_layer(&sem_number(&[(102, "dual")]), false)
            .unwrap_err();
        assert!(matches!(err, EnrichError::PersistenceCollision { .. }));
        assert_eq!(fs::read(store.layer_path("semNumber")).unwrap(), before);
    }
}
