use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::corpus::{
    DEFAULT_SECTION_FEATURES, DEFAULT_SECTION_TYPES, DEFAULT_SLOT_TYPE, OTYPE_FEATURE,
};
use crate::constants::layers::MISMATCH_SAMPLE_LIMIT;
use crate::corpus::layers::{FeatureLayer, FeatureMeta, LayerStore, ValueType};
use crate::corpus::{CorpusProvider, SectionRef};
use crate::errors::EnrichError;
use crate::types::{FeatureName, FeatureValue, FormatName, NodeId, ObjectType};

/// Object types and heading features of the three section levels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Object types for book, chapter, and verse.
    pub types: [ObjectType; 3],
    /// Features holding the book name, chapter number, and verse number.
    pub features: [FeatureName; 3],
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            types: DEFAULT_SECTION_TYPES.map(str::to_string),
            features: DEFAULT_SECTION_FEATURES.map(str::to_string),
        }
    }
}

#[derive(Clone, Debug)]
enum TemplatePart {
    Literal(String),
    Feature(FeatureName),
}

/// Parsed text format: literals interleaved with `{feature}` placeholders.
#[derive(Clone, Debug)]
struct TextFormat {
    template: String,
    parts: Vec<TemplatePart>,
}

impl TextFormat {
    fn parse(template: &str) -> Result<Self, String> {
        let mut parts = Vec::new();
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            if open > 0 {
                parts.push(TemplatePart::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| format!("unclosed placeholder in '{template}'"))?;
            let feature = after[..close].trim();
            if feature.is_empty() {
                return Err(format!("empty placeholder in '{template}'"));
            }
            parts.push(TemplatePart::Feature(feature.to_string()));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            parts.push(TemplatePart::Literal(rest.to_string()));
        }
        Ok(Self {
            template: template.to_string(),
            parts,
        })
    }
}

#[derive(Clone, Debug)]
struct NodeEntry {
    otype: ObjectType,
    /// Sorted, deduplicated slots; a slot node covers only itself.
    slots: Vec<NodeId>,
}

/// In-memory corpus graph implementing `CorpusProvider`.
///
/// Node ids are dense: slots are `1..=max_slot`, other nodes follow.
#[derive(Clone, Debug)]
pub struct InMemoryCorpus {
    id: String,
    slot_type: ObjectType,
    max_slot: NodeId,
    nodes: Vec<NodeEntry>,
    by_type: HashMap<ObjectType, Vec<NodeId>>,
    features: IndexMap<FeatureName, FeatureLayer>,
    formats: IndexMap<FormatName, TextFormat>,
    sections: SectionConfig,
}

impl InMemoryCorpus {
    /// Build a corpus from a snapshot.
    pub fn from_snapshot(snapshot: CorpusSnapshot) -> Result<Self, EnrichError> {
        let mut builder = CorpusBuilder::new(snapshot.id)
            .with_slot_type(snapshot.slot_type)
            .with_sections(snapshot.sections);
        for _ in 0..snapshot.slot_count {
            builder.add_slot();
        }
        for node in snapshot.nodes {
            builder.add_node(node.otype, node.slots);
        }
        for (name, values) in snapshot.features {
            for (node, value) in values {
                builder.set_feature(&name, node, value);
            }
        }
        for (name, template) in snapshot.formats {
            builder = builder.with_format(name, template);
        }
        builder.build()
    }

    /// Parse a JSON snapshot.
    pub fn from_json_str(json: &str) -> Result<Self, EnrichError> {
        Self::from_snapshot(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON snapshot file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EnrichError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| EnrichError::SnapshotRead {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot = serde_json::from_str(&text).map_err(|source| EnrichError::SnapshotParse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_snapshot(snapshot)
    }

    /// Describe this corpus as a serializable snapshot.
    pub fn to_snapshot(&self) -> CorpusSnapshot {
        CorpusSnapshot {
            id: self.id.clone(),
            slot_type: self.slot_type.clone(),
            slot_count: self.max_slot,
            nodes: self.nodes[self.max_slot as usize..]
                .iter()
                .map(|entry| SnapshotNode {
                    otype: entry.otype.clone(),
                    slots: entry.slots.clone(),
                })
                .collect(),
            features: self
                .features
                .iter()
                .map(|(name, layer)| (name.clone(), layer.values.clone()))
                .collect(),
            formats: self
                .formats
                .iter()
                .map(|(name, format)| (name.clone(), format.template.clone()))
                .collect(),
            sections: self.sections.clone(),
        }
    }

    /// Highest slot id.
    pub fn max_slot(&self) -> NodeId {
        self.max_slot
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Loaded feature names, in load order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.features.keys().map(String::as_str).collect()
    }

    /// Loaded feature layer named `name`.
    pub fn feature(&self, name: &str) -> Option<&FeatureLayer> {
        self.features.get(name)
    }

    /// Registered text format names.
    pub fn format_names(&self) -> Vec<&str> {
        self.formats.keys().map(String::as_str).collect()
    }

    /// Add a feature layer, replacing a loaded layer with the same name.
    ///
    /// Every node in the layer must exist in this corpus.
    pub fn add_layer(&mut self, layer: FeatureLayer) -> Result<(), EnrichError> {
        if layer.name == OTYPE_FEATURE {
            return Err(EnrichError::Configuration(format!(
                "'{OTYPE_FEATURE}' is built in and cannot be replaced"
            )));
        }
        let missing: Vec<NodeId> = layer
            .values
            .keys()
            .copied()
            .filter(|node| !self.contains(*node))
            .collect();
        if !missing.is_empty() {
            return Err(EnrichError::IdentifierMismatch {
                feature: layer.name.clone(),
                corpus_id: self.id.clone(),
                count: missing.len(),
                sample: missing.into_iter().take(MISMATCH_SAMPLE_LIMIT).collect(),
            });
        }
        if self.features.contains_key(&layer.name) {
            debug!(corpus = %self.id, feature = %layer.name, "replacing loaded feature");
        }
        self.features.insert(layer.name.clone(), layer);
        Ok(())
    }

    /// Load named layers from `store` and make them queryable.
    ///
    /// Returns the loaded names. A name the store does not hold fails with
    /// `LayerNotFound` and leaves earlier names loaded.
    pub fn load_features(
        &mut self,
        store: &dyn LayerStore,
        names: &[&str],
    ) -> Result<Vec<FeatureName>, EnrichError> {
        let mut loaded = Vec::with_capacity(names.len());
        for name in names {
            let layer = store
                .load_layer(name)?
                .ok_or_else(|| EnrichError::LayerNotFound {
                    feature: name.to_string(),
                    location: store.location(),
                })?;
            debug!(
                corpus = %self.id,
                feature = %name,
                nodes = layer.len(),
                "loading feature layer"
            );
            self.add_layer(layer)?;
            loaded.push(name.to_string());
        }
        Ok(loaded)
    }

    fn entry(&self, node: NodeId) -> Option<&NodeEntry> {
        if node == 0 {
            return None;
        }
        self.nodes.get((node - 1) as usize)
    }

    fn slots_of(&self, node: NodeId) -> &[NodeId] {
        self.entry(node)
            .map(|entry| entry.slots.as_slice())
            .unwrap_or(&[])
    }

    /// True if `inner` lies within `outer` (and is a different node).
    fn embeds(&self, outer: NodeId, inner: NodeId) -> bool {
        if outer == inner {
            return false;
        }
        let outer_slots = self.slots_of(outer);
        let inner_slots = self.slots_of(inner);
        let (Some(outer_first), Some(outer_last)) = (outer_slots.first(), outer_slots.last()) else {
            return false;
        };
        let (Some(inner_first), Some(inner_last)) = (inner_slots.first(), inner_slots.last()) else {
            return false;
        };
        if inner_first < outer_first || inner_last > outer_last {
            return false;
        }
        inner_slots
            .iter()
            .all(|slot| outer_slots.binary_search(slot).is_ok())
    }

    fn section_value(&self, level: usize, node: NodeId) -> Option<&str> {
        self.feature_value(&self.sections.features[level], node)
            .ok()
            .flatten()
    }

    /// Section node at `level` that holds `node`'s first slot.
    fn section_node_at(&self, level: usize, node: NodeId) -> Option<NodeId> {
        let otype = &self.sections.types[level];
        if self.otype(node) == Some(otype.as_str()) {
            return Some(node);
        }
        let first_slot = *self.slots_of(node).first()?;
        if self.otype(first_slot) == Some(otype.as_str()) {
            return Some(first_slot);
        }
        self.ancestors(first_slot, otype).into_iter().next()
    }

    fn render_slot(
        &self,
        slot: NodeId,
        format: &TextFormat,
        out: &mut String,
    ) -> Result<(), EnrichError> {
        for part in &format.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Feature(feature) => {
                    if let Some(value) = self.feature_value(feature, slot)? {
                        out.push_str(value);
                    }
                }
            }
        }
        Ok(())
    }
}

impl CorpusProvider for InMemoryCorpus {
    fn id(&self) -> &str {
        &self.id
    }

    fn slot_type(&self) -> &str {
        &self.slot_type
    }

    fn section_types(&self) -> [&str; 3] {
        self.sections.types.each_ref().map(String::as_str)
    }

    fn contains(&self, node: NodeId) -> bool {
        self.entry(node).is_some()
    }

    fn otype(&self, node: NodeId) -> Option<&str> {
        self.entry(node).map(|entry| entry.otype.as_str())
    }

    fn has_feature(&self, feature: &str) -> bool {
        feature == OTYPE_FEATURE || self.features.contains_key(feature)
    }

    fn feature_value(&self, feature: &str, node: NodeId) -> Result<Option<&str>, EnrichError> {
        if feature == OTYPE_FEATURE {
            return Ok(self.otype(node));
        }
        let layer = self
            .features
            .get(feature)
            .ok_or_else(|| EnrichError::FeatureNotLoaded {
                corpus_id: self.id.clone(),
                feature: feature.to_string(),
            })?;
        Ok(layer.get(node))
    }

    fn nodes_of_type(&self, otype: &str) -> Vec<NodeId> {
        self.by_type.get(otype).cloned().unwrap_or_default()
    }

    fn descendants(&self, scope: NodeId, otype: &str) -> Vec<NodeId> {
        if !self.contains(scope) {
            return Vec::new();
        }
        self.by_type
            .get(otype)
            .map(|nodes| {
                nodes
                    .iter()
                    .copied()
                    .filter(|node| self.embeds(scope, *node))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn ancestors(&self, node: NodeId, otype: &str) -> Vec<NodeId> {
        if !self.contains(node) {
            return Vec::new();
        }
        self.by_type
            .get(otype)
            .map(|nodes| {
                nodes
                    .iter()
                    .copied()
                    .filter(|outer| self.embeds(*outer, node))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn render_text(&self, nodes: &[NodeId], format: &str) -> Result<String, EnrichError> {
        let text_format = self
            .formats
            .get(format)
            .ok_or_else(|| EnrichError::UnknownFormat {
                corpus_id: self.id.clone(),
                format: format.to_string(),
            })?;
        let mut out = String::new();
        for node in nodes {
            let entry = self
                .entry(*node)
                .ok_or_else(|| EnrichError::CorpusInconsistent {
                    corpus_id: self.id.clone(),
                    details: format!("cannot render unknown node {node}"),
                })?;
            for slot in &entry.slots {
                self.render_slot(*slot, text_format, &mut out)?;
            }
        }
        Ok(out)
    }

    fn section_of(&self, node: NodeId) -> Option<SectionRef> {
        let own_level = self
            .otype(node)
            .and_then(|otype| self.sections.types.iter().position(|t| t == otype));
        let depth = own_level.map(|level| level + 1).unwrap_or(3);

        let book_node = self.section_node_at(0, node)?;
        let mut section = SectionRef::book(self.section_value(0, book_node)?);
        if depth < 2 {
            return Some(section);
        }
        let Some(chapter) = self
            .section_node_at(1, node)
            .and_then(|chapter_node| self.section_value(1, chapter_node))
            .and_then(|value| value.trim().parse().ok())
        else {
            return Some(section);
        };
        section.chapter = Some(chapter);
        if depth < 3 {
            return Some(section);
        }
        section.verse = self
            .section_node_at(2, node)
            .and_then(|verse_node| self.section_value(2, verse_node))
            .and_then(|value| value.trim().parse().ok());
        Some(section)
    }

    fn node_from_section(&self, section: &SectionRef) -> Option<NodeId> {
        let book = self
            .nodes_of_type(&self.sections.types[0])
            .into_iter()
            .find(|node| self.section_value(0, *node) == Some(section.book.as_str()))?;
        let Some(chapter) = section.chapter else {
            return Some(book);
        };
        let matches_number = |level: usize, node: NodeId, wanted: u32| {
            self.section_value(level, node)
                .and_then(|value| value.trim().parse::<u32>().ok())
                == Some(wanted)
        };
        let chapter_node = self
            .descendants(book, &self.sections.types[1])
            .into_iter()
            .find(|node| matches_number(1, *node, chapter))?;
        let Some(verse) = section.verse else {
            return Some(chapter_node);
        };
        self.descendants(chapter_node, &self.sections.types[2])
            .into_iter()
            .find(|node| matches_number(2, *node, verse))
    }
}

/// Incremental builder for `InMemoryCorpus`.
///
/// All slots must be added before the first non-slot node.
#[derive(Clone, Debug)]
pub struct CorpusBuilder {
    id: String,
    slot_type: ObjectType,
    max_slot: NodeId,
    others: Vec<NodeEntry>,
    slot_after_node: bool,
    features: IndexMap<FeatureName, BTreeMap<NodeId, FeatureValue>>,
    feature_meta: HashMap<FeatureName, FeatureMeta>,
    formats: IndexMap<FormatName, String>,
    sections: SectionConfig,
}

impl CorpusBuilder {
    /// Start an empty corpus with identifier `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slot_type: DEFAULT_SLOT_TYPE.to_string(),
            max_slot: 0,
            others: Vec::new(),
            slot_after_node: false,
            features: IndexMap::new(),
            feature_meta: HashMap::new(),
            formats: IndexMap::new(),
            sections: SectionConfig::default(),
        }
    }

    /// Override the slot object type.
    pub fn with_slot_type(mut self, slot_type: impl Into<ObjectType>) -> Self {
        self.slot_type = slot_type.into();
        self
    }

    /// Override the section configuration.
    pub fn with_sections(mut self, sections: SectionConfig) -> Self {
        self.sections = sections;
        self
    }

    /// Register a text format such as `("text-orig-full", "{text}{trailer}")`.
    pub fn with_format(mut self, name: impl Into<FormatName>, template: impl Into<String>) -> Self {
        self.formats.insert(name.into(), template.into());
        self
    }

    /// Set metadata for a built-in feature (defaults to `str` without provenance).
    pub fn with_feature_meta(mut self, feature: impl Into<FeatureName>, meta: FeatureMeta) -> Self {
        self.feature_meta.insert(feature.into(), meta);
        self
    }

    /// Append a slot and return its id.
    pub fn add_slot(&mut self) -> NodeId {
        if !self.others.is_empty() {
            self.slot_after_node = true;
        }
        self.max_slot += 1;
        self.max_slot
    }

    /// Append a slot carrying `features` and return its id.
    pub fn add_slot_with(&mut self, features: &[(&str, &str)]) -> NodeId {
        let slot = self.add_slot();
        for (feature, value) in features {
            self.set_feature(feature, slot, *value);
        }
        slot
    }

    /// Append a non-slot node covering `slots` and return its id.
    pub fn add_node(
        &mut self,
        otype: impl Into<ObjectType>,
        slots: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        let mut slots: Vec<NodeId> = slots.into_iter().collect();
        slots.sort_unstable();
        slots.dedup();
        self.others.push(NodeEntry {
            otype: otype.into(),
            slots,
        });
        self.max_slot + self.others.len() as NodeId
    }

    /// Set `feature` for `node`.
    pub fn set_feature(
        &mut self,
        feature: &str,
        node: NodeId,
        value: impl Into<FeatureValue>,
    ) -> &mut Self {
        self.features
            .entry(feature.to_string())
            .or_default()
            .insert(node, value.into());
        self
    }

    /// Validate and freeze the corpus.
    pub fn build(self) -> Result<InMemoryCorpus, EnrichError> {
        let inconsistent = |details: String| EnrichError::CorpusInconsistent {
            corpus_id: self.id.clone(),
            details,
        };
        if self.slot_after_node {
            return Err(inconsistent(
                "slots must be added before other nodes".into(),
            ));
        }
        if self.sections.types.contains(&self.slot_type) {
            return Err(inconsistent(format!(
                "slot type '{}' cannot be a section type",
                self.slot_type
            )));
        }

        let mut nodes: Vec<NodeEntry> = (1..=self.max_slot)
            .map(|slot| NodeEntry {
                otype: self.slot_type.clone(),
                slots: vec![slot],
            })
            .collect();
        for (offset, entry) in self.others.iter().enumerate() {
            let node = self.max_slot + offset as NodeId + 1;
            if entry.otype == self.slot_type {
                return Err(inconsistent(format!(
                    "node {node} uses the slot type '{}'",
                    entry.otype
                )));
            }
            match (entry.slots.first(), entry.slots.last()) {
                (Some(first), Some(last)) if *first >= 1 && *last <= self.max_slot => {}
                (None, _) => return Err(inconsistent(format!("node {node} covers no slots"))),
                _ => {
                    return Err(inconsistent(format!(
                        "node {node} covers slots outside 1..={}",
                        self.max_slot
                    )));
                }
            }
            nodes.push(entry.clone());
        }

        let mut order: Vec<NodeId> = (1..=nodes.len() as NodeId).collect();
        order.sort_by_key(|node| {
            let slots = &nodes[(*node - 1) as usize].slots;
            (slots[0], Reverse(slots.len()), *node)
        });
        let mut by_type: HashMap<ObjectType, Vec<NodeId>> = HashMap::new();
        for node in order {
            by_type
                .entry(nodes[(node - 1) as usize].otype.clone())
                .or_default()
                .push(node);
        }

        let mut formats = IndexMap::new();
        for (name, template) in self.formats {
            let format = TextFormat::parse(&template).map_err(|reason| {
                EnrichError::Configuration(format!("text format '{name}': {reason}"))
            })?;
            formats.insert(name, format);
        }

        let mut corpus = InMemoryCorpus {
            id: self.id.clone(),
            slot_type: self.slot_type,
            max_slot: self.max_slot,
            nodes,
            by_type,
            features: IndexMap::new(),
            formats,
            sections: self.sections,
        };
        let mut feature_meta = self.feature_meta;
        for (name, values) in self.features {
            let meta = feature_meta
                .remove(&name)
                .unwrap_or_else(|| FeatureMeta::new(ValueType::Str, "", ""));
            corpus.add_layer(FeatureLayer::new(name, meta, values))?;
        }
        Ok(corpus)
    }
}

/// One non-slot node in a snapshot; ids are assigned in list order after the slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNode {
    /// Object type.
    pub otype: ObjectType,
    /// Covered slots.
    pub slots: Vec<NodeId>,
}

/// Serializable description of an `InMemoryCorpus`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSnapshot {
    /// Corpus identifier.
    pub id: String,
    /// Slot object type.
    #[serde(default = "default_slot_type")]
    pub slot_type: ObjectType,
    /// Number of slots (ids `1..=slot_count`).
    pub slot_count: NodeId,
    /// Non-slot nodes in id order.
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
    /// Feature values keyed by feature, then node.
    #[serde(default)]
    pub features: IndexMap<FeatureName, BTreeMap<NodeId, FeatureValue>>,
    /// Text format templates keyed by name.
    #[serde(default)]
    pub formats: IndexMap<FormatName, String>,
    /// Section configuration.
    #[serde(default)]
    pub sections: SectionConfig,
}

fn default_slot_type() -> ObjectType {
    DEFAULT_SLOT_TYPE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::layers::InMemoryLayerStore;

    /// Two verses of one chapter; words 1-3 in verse 1, words 4-5 in verse 2.
    fn tiny_corpus() -> InMemoryCorpus {
        let mut builder = CorpusBuilder::new("tiny")
            .with_format("text-orig-full", "{text}{trailer}")
            .with_format("lex", "<{lemma}> ");
        for (text, lemma) in [
            ("In", "in"),
            ("the", "the"),
            ("beginning", "begin"),
            ("God", "god"),
            ("created", "create"),
        ] {
            builder.add_slot_with(&[("text", text), ("trailer", " "), ("lemma", lemma)]);
        }
        let book = builder.add_node("book", 1..=5);
        let chapter = builder.add_node("chapter", 1..=5);
        let verse1 = builder.add_node("verse", 1..=3);
        let verse2 = builder.add_node("verse", 4..=5);
        let phrase = builder.add_node("phrase", [2, 3]);
        builder.set_feature("book", book, "Genesis");
        builder.set_feature("chapter", chapter, "1");
        builder.set_feature("verse", verse1, "1");
        builder.set_feature("verse", verse2, "2");
        builder.set_feature("Cat", phrase, "np");
        builder.build().unwrap()
    }

    #[test]
    fn node_ids_are_dense_and_typed() {
        let corpus = tiny_corpus();
        assert_eq!(corpus.max_slot(), 5);
        assert_eq!(corpus.node_count(), 10);
        assert_eq!(corpus.otype(1), Some("word"));
        assert_eq!(corpus.otype(6), Some("book"));
        assert_eq!(corpus.otype(10), Some("phrase"));
        assert_eq!(corpus.otype(11), None);
        assert!(!corpus.contains(0));
        assert_eq!(corpus.feature_value("otype", 7).unwrap(), Some("chapter"));
    }

    #[test]
    fn traversal_follows_slot_containment() {
        let corpus = tiny_corpus();
        assert_eq!(corpus.descendants(6, "verse"), vec![8, 9]);
        assert_eq!(corpus.descendants(8, "word"), vec![1, 2, 3]);
        assert_eq!(corpus.descendants(8, "phrase"), vec![10]);
        assert_eq!(corpus.ancestors(10, "verse"), vec![8]);
        assert_eq!(corpus.ancestors(4, "verse"), vec![9]);
        assert!(corpus.descendants(9, "phrase").is_empty());
        assert!(corpus.descendants(99, "word").is_empty());
    }

    #[test]
    fn canonical_order_puts_containers_first() {
        let corpus = tiny_corpus();
        assert_eq!(corpus.nodes_of_type("verse"), vec![8, 9]);
        // book and chapter share all slots; the lower id comes first
        assert_eq!(corpus.ancestors(1, "chapter"), vec![7]);
    }

    #[test]
    fn render_uses_named_formats() {
        let corpus = tiny_corpus();
        assert_eq!(corpus.render_text(&[10], "text-orig-full").unwrap(), "the beginning ");
        assert_eq!(corpus.render_text(&[4, 5], "lex").unwrap(), "<god> <create> ");
        assert!(matches!(
            corpus.render_text(&[1], "nope"),
            Err(EnrichError::UnknownFormat { .. })
        ));
        assert!(matches!(
            corpus.render_text(&[42], "lex"),
            Err(EnrichError::CorpusInconsistent { .. })
        ));
    }

    #[test]
    fn sections_resolve_both_ways() {
        let corpus = tiny_corpus();
        assert_eq!(corpus.section_of(10), Some(SectionRef::verse("Genesis", 1, 1)));
        assert_eq!(corpus.section_of(6), Some(SectionRef::book("Genesis")));
        assert_eq!(corpus.section_of(7), Some(SectionRef::chapter("Genesis", 1)));
        assert_eq!(corpus.location_label(5).as_deref(), Some("Genesis 1:2"));

        assert_eq!(corpus.node_from_section(&SectionRef::book("Genesis")), Some(6));
        assert_eq!(corpus.node_from_section(&SectionRef::chapter("Genesis", 1)), Some(7));
        assert_eq!(corpus.node_from_section(&SectionRef::verse("Genesis", 1, 2)), Some(9));
        assert_eq!(corpus.node_from_section(&SectionRef::verse("Genesis", 1, 3)), None);
        assert_eq!(corpus.node_from_section(&SectionRef::book("Exodus")), None);
    }

    #[test]
    fn unknown_features_are_reported() {
        let corpus = tiny_corpus();
        assert!(corpus.has_feature("Cat"));
        assert!(!corpus.has_feature("gn"));
        assert!(matches!(
            corpus.feature_value("gn", 1),
            Err(EnrichError::FeatureNotLoaded { .. })
        ));
        assert_eq!(corpus.feature_value("Cat", 1).unwrap(), None);
    }

    #[test]
    fn builder_rejects_inconsistent_layouts() {
        let mut late_slot = CorpusBuilder::new("bad");
        late_slot.add_slot();
        late_slot.add_node("phrase", [1]);
        late_slot.add_slot();
        assert!(matches!(late_slot.build(), Err(EnrichError::CorpusInconsistent { .. })));

        let mut out_of_range = CorpusBuilder::new("bad");
        out_of_range.add_slot();
        out_of_range.add_node("phrase", [1, 2]);
        assert!(matches!(out_of_range.build(), Err(EnrichError::CorpusInconsistent { .. })));

        let mut empty = CorpusBuilder::new("bad");
        empty.add_slot();
        empty.add_node("phrase", []);
        assert!(matches!(empty.build(), Err(EnrichError::CorpusInconsistent { .. })));

        let bad_format = CorpusBuilder::new("bad").with_format("broken", "{text");
        assert!(matches!(bad_format.build(), Err(EnrichError::Configuration(_))));
    }

    #[test]
    fn load_features_adds_store_layers() {
        let mut corpus = tiny_corpus();
        let store = InMemoryLayerStore::new();
        let mut values = BTreeMap::new();
        values.insert(10, "plural".to_string());
        store
            .save_layer(
                &FeatureLayer::new("semNumber", FeatureMeta::default(), values),
                false,
            )
            .unwrap();

        let loaded = corpus.load_features(&store, &["semNumber"]).unwrap();
        assert_eq!(loaded, vec!["semNumber".to_string()]);
        assert_eq!(corpus.feature_value("semNumber", 10).unwrap(), Some("plural"));
        assert!(matches!(
            corpus.load_features(&store, &["missing"]),
            Err(EnrichError::LayerNotFound { .. })
        ));
    }

    #[test]
    fn layers_with_unknown_nodes_are_rejected() {
        let mut corpus = tiny_corpus();
        let mut values = BTreeMap::new();
        values.insert(3, "ok".to_string());
        values.insert(500, "stray".to_string());
        let err = corpus
            .add_layer(FeatureLayer::new("stray", FeatureMeta::default(), values))
            .unwrap_err();
        match err {
            EnrichError::IdentifierMismatch { count, sample, .. } => {
                assert_eq!(count, 1);
                assert_eq!(sample, vec![500]);
            }
            other => panic!("expected IdentifierMismatch, got {other:?}"),
        }
        assert!(!corpus.has_feature("stray"));
    }

    #[test]
    fn snapshots_round_trip_through_json() {
        let corpus = tiny_corpus();
        let json = serde_json::to_string(&corpus.to_snapshot()).unwrap();
        let restored = InMemoryCorpus::from_json_str(&json).unwrap();
        assert_eq!(restored.node_count(), corpus.node_count());
        assert_eq!(restored.feature_value("Cat", 10).unwrap(), Some("np"));
        assert_eq!(
            restored.render_text(&[8], "text-orig-full").unwrap(),
            corpus.render_text(&[8], "text-orig-full").unwrap()
        );
    }

    #[test]
    fn json_snapshot_defaults_are_applied() {
        let json = r#"{
            "id": "mini",
            "slot_count": 2,
            "nodes": [{"otype": "book", "slots": [1, 2]}],
            "features": {"book": {"3": "Jude"}, "text": {"1": "a", "2": "b"}},
            "formats": {"text-orig-full": "{text} "}
        }"#;
        let corpus = InMemoryCorpus::from_json_str(json).unwrap();
        assert_eq!(corpus.slot_type(), "word");
        assert_eq!(corpus.node_from_section(&SectionRef::book("Jude")), Some(3));
        assert_eq!(corpus.render_text(&[3], "text-orig-full").unwrap(), "a b ");
        assert_eq!(corpus.format_names(), vec!["text-orig-full"]);
    }

    #[test]
    fn snapshot_file_errors_name_the_file() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("corpus.json");
        let err = InMemoryCorpus::from_json_file(&missing).unwrap_err();
        assert!(matches!(err, EnrichError::SnapshotRead { .. }));
        assert!(err.to_string().contains("corpus.json"), "{err}");

        let broken = temp.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let err = InMemoryCorpus::from_json_file(&broken).unwrap_err();
        assert!(matches!(err, EnrichError::SnapshotParse { .. }));
        assert!(err.to_string().contains("broken.json"), "{err}");
    }
}
