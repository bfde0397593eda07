//! Corpus provider interfaces.
//!
//! Ownership model:
//! - `CorpusProvider` is the read-only surface the round-trip needs: feature
//!   lookup, containment traversal, text rendering, and section labels.
//! - `layers::LayerStore` is the write-once surface used to persist new
//!   feature layers.
//! - `memory::InMemoryCorpus` implements the provider for tests, demos, and
//!   small corpora described by JSON snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::EnrichError;
use crate::types::{BookName, LocationLabel, NodeId};

/// Feature layers, metadata, and layer stores.
pub mod layers;
/// In-memory corpus implementation and builder.
pub mod memory;
/// Plain-text node-feature codec.
pub mod tf;

pub use layers::{
    DirLayerStore, FeatureLayer, FeatureMeta, InMemoryLayerStore, LayerStore, ValueType,
};
pub use memory::{CorpusBuilder, CorpusSnapshot, InMemoryCorpus};

/// Reference to a book, chapter, or verse by heading.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionRef {
    /// Book heading.
    pub book: BookName,
    /// Chapter number within the book.
    pub chapter: Option<u32>,
    /// Verse number within the chapter (requires `chapter`).
    pub verse: Option<u32>,
}

impl SectionRef {
    /// Reference a whole book.
    pub fn book(book: impl Into<BookName>) -> Self {
        Self {
            book: book.into(),
            chapter: None,
            verse: None,
        }
    }

    /// Reference one chapter of a book.
    pub fn chapter(book: impl Into<BookName>, chapter: u32) -> Self {
        Self {
            book: book.into(),
            chapter: Some(chapter),
            verse: None,
        }
    }

    /// Reference one verse.
    pub fn verse(book: impl Into<BookName>, chapter: u32, verse: u32) -> Self {
        Self {
            book: book.into(),
            chapter: Some(chapter),
            verse: Some(verse),
        }
    }
}

impl fmt::Display for SectionRef {
    /// Formats as `Book`, `Book 3`, or `Book 3:4`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.book)?;
        if let Some(chapter) = self.chapter {
            write!(f, " {chapter}")?;
            if let Some(verse) = self.verse {
                write!(f, ":{verse}")?;
            }
        }
        Ok(())
    }
}

/// Read-only corpus surface used by the selector, exporter, and statistics.
///
/// Traversal results are always in corpus canonical order. Implementations
/// must return the same results for the same corpus state.
pub trait CorpusProvider {
    /// Stable corpus identifier used in diagnostics.
    fn id(&self) -> &str;
    /// Object type of slot nodes (usually `word`).
    fn slot_type(&self) -> &str;
    /// Object types of the book, chapter, and verse levels.
    fn section_types(&self) -> [&str; 3];
    /// True if `node` exists in this corpus.
    fn contains(&self, node: NodeId) -> bool;
    /// Object type of `node`.
    fn otype(&self, node: NodeId) -> Option<&str>;
    /// True if a feature named `feature` is loaded (or built in).
    fn has_feature(&self, feature: &str) -> bool;
    /// Value of `feature` for `node`.
    ///
    /// Returns `FeatureNotLoaded` when the feature is unknown and `Ok(None)`
    /// when the node simply has no value.
    fn feature_value(&self, feature: &str, node: NodeId) -> Result<Option<&str>, EnrichError>;
    /// All nodes of type `otype`.
    fn nodes_of_type(&self, otype: &str) -> Vec<NodeId>;
    /// Nodes of type `otype` embedded in `scope`.
    fn descendants(&self, scope: NodeId, otype: &str) -> Vec<NodeId>;
    /// Nodes of type `otype` that embed `node`.
    fn ancestors(&self, node: NodeId, otype: &str) -> Vec<NodeId>;
    /// Render the slots of `nodes` using the named text format.
    fn render_text(&self, nodes: &[NodeId], format: &str) -> Result<String, EnrichError>;
    /// Section heading of `node`, as deep as the node's own level.
    fn section_of(&self, node: NodeId) -> Option<SectionRef>;
    /// Node of the section referenced by `section`.
    fn node_from_section(&self, section: &SectionRef) -> Option<NodeId>;

    /// Human-readable location label (e.g., `Jude 1:3`).
    fn location_label(&self, node: NodeId) -> Option<LocationLabel> {
        self.section_of(node).map(|section| section.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_refs_format_by_depth() {
        assert_eq!(SectionRef::book("Jude").to_string(), "Jude");
        assert_eq!(SectionRef::chapter("Leviticus", 18).to_string(), "Leviticus 18");
        assert_eq!(SectionRef::verse("Jude", 1, 3).to_string(), "Jude 1:3");
    }
}
