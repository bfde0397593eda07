use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::{CorpusProvider, SectionRef};
use crate::errors::EnrichError;
use crate::types::{FeatureName, FeatureValue, NodeId, ObjectType};

/// `feature == value` test on a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCondition {
    /// Feature to read.
    pub feature: FeatureName,
    /// Required value.
    pub value: FeatureValue,
}

/// Predicate over object type plus feature conditions (all must hold).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPredicate {
    /// Required object type.
    pub otype: ObjectType,
    /// Feature conditions.
    pub conditions: Vec<FeatureCondition>,
}

impl ObjectPredicate {
    /// Match every object of type `otype`.
    pub fn new(otype: impl Into<ObjectType>) -> Self {
        Self {
            otype: otype.into(),
            conditions: Vec::new(),
        }
    }

    /// Additionally require `feature == value`.
    pub fn with_feature(
        mut self,
        feature: impl Into<FeatureName>,
        value: impl Into<FeatureValue>,
    ) -> Self {
        self.conditions.push(FeatureCondition {
            feature: feature.into(),
            value: value.into(),
        });
        self
    }
}

/// Region of the corpus a selection is restricted to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    /// The whole corpus.
    Corpus,
    /// Objects embedded in a node.
    Node(NodeId),
    /// Objects embedded in a book, chapter, or verse.
    Section(SectionRef),
}

/// Ordered node ids matching a predicate. Computed per run; never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    /// Object type the selection was made for.
    pub otype: ObjectType,
    /// Matching nodes in corpus order.
    pub nodes: Vec<NodeId>,
}

impl SelectionSet {
    /// Wrap an explicit node list.
    pub fn new(otype: impl Into<ObjectType>, nodes: Vec<NodeId>) -> Self {
        Self {
            otype: otype.into(),
            nodes,
        }
    }

    /// Number of selected nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Selected nodes in order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }
}

/// Enumerate nodes matching `predicate` within `scope`, in corpus order.
///
/// An empty result is not an error. Unresolvable sections and unloaded
/// predicate features are.
pub fn select(
    corpus: &dyn CorpusProvider,
    predicate: &ObjectPredicate,
    scope: &Scope,
) -> Result<SelectionSet, EnrichError> {
    for condition in &predicate.conditions {
        if !corpus.has_feature(&condition.feature) {
            return Err(EnrichError::FeatureNotLoaded {
                corpus_id: corpus.id().to_string(),
                feature: condition.feature.clone(),
            });
        }
    }

    let candidates = match scope {
        Scope::Corpus => corpus.nodes_of_type(&predicate.otype),
        Scope::Node(node) => corpus.descendants(*node, &predicate.otype),
        Scope::Section(section) => {
            let node = corpus
                .node_from_section(section)
                .ok_or_else(|| EnrichError::UnknownSection {
                    corpus_id: corpus.id().to_string(),
                    section: section.to_string(),
                })?;
            corpus.descendants(node, &predicate.otype)
        }
    };

    let mut nodes = Vec::with_capacity(candidates.len());
    for node in candidates {
        if matches(corpus, predicate, node)? {
            nodes.push(node);
        }
    }
    if nodes.is_empty() {
        debug!(
            corpus = %corpus.id(),
            otype = %predicate.otype,
            scope = ?scope,
            "selection is empty"
        );
    }
    Ok(SelectionSet::new(predicate.otype.clone(), nodes))
}

fn matches(
    corpus: &dyn CorpusProvider,
    predicate: &ObjectPredicate,
    node: NodeId,
) -> Result<bool, EnrichError> {
    for condition in &predicate.conditions {
        if corpus.feature_value(&condition.feature, node)? != Some(condition.value.as_str()) {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusBuilder, InMemoryCorpus};

    /// Book "Jude" with two chapters; phrases 8-11 alternate np/vp.
    fn corpus() -> InMemoryCorpus {
        let mut builder = CorpusBuilder::new("select-test");
        for _ in 0..4 {
            builder.add_slot();
        }
        let book = builder.add_node("book", 1..=4);
        let ch1 = builder.add_node("chapter", 1..=2);
        let ch2 = builder.add_node("chapter", 3..=4);
        let phrases: Vec<NodeId> = (1..=4).map(|slot| builder.add_node("phrase", [slot])).collect();
        builder.set_feature("book", book, "Jude");
        builder.set_feature("chapter", ch1, "1");
        builder.set_feature("chapter", ch2, "2");
        for (idx, phrase) in phrases.iter().enumerate() {
            builder.set_feature("Cat", *phrase, if idx % 2 == 0 { "np" } else { "vp" });
        }
        builder.build().unwrap()
    }

    #[test]
    fn selects_by_category_within_book() {
        let corpus = corpus();
        let predicate = ObjectPredicate::new("phrase").with_feature("Cat", "np");
        let jude = Scope::Section(SectionRef::book("Jude"));
        let selection = select(&corpus, &predicate, &jude).unwrap();
        assert_eq!(selection.nodes, vec![8, 10]);
        assert_eq!(selection.otype, "phrase");
    }

    #[test]
    fn scopes_narrow_the_candidates() {
        let corpus = corpus();
        let predicate = ObjectPredicate::new("phrase");
        let all = select(&corpus, &predicate, &Scope::Corpus).unwrap();
        assert_eq!(all.len(), 4);
        let chapter_scope = Scope::Section(SectionRef::chapter("Jude", 2));
        let chapter_two = select(&corpus, &predicate, &chapter_scope).unwrap();
        assert_eq!(chapter_two.iter().collect::<Vec<_>>(), vec![10, 11]);
        let by_node = select(&corpus, &predicate, &Scope::Node(6)).unwrap();
        assert_eq!(by_node.nodes, vec![8, 9]);
    }

    #[test]
    fn no_match_is_an_empty_selection() {
        let corpus = corpus();
        let predicate = ObjectPredicate::new("phrase").with_feature("Cat", "pp");
        let selection = select(&corpus, &predicate, &Scope::Corpus).unwrap();
        assert!(selection.is_empty());
        let missing_type =
            select(&corpus, &ObjectPredicate::new("clause"), &Scope::Corpus).unwrap();
        assert!(missing_type.is_empty());
    }

    #[test]
    fn caller_mistakes_are_errors() {
        let corpus = corpus();
        let unknown_book = select(
            &corpus,
            &ObjectPredicate::new("phrase"),
            &Scope::Section(SectionRef::book("Tobit")),
        );
        assert!(matches!(unknown_book, Err(EnrichError::UnknownSection { .. })));

        let unloaded = select(
            &corpus,
            &ObjectPredicate::new("phrase").with_feature("Function", "Subj"),
            &Scope::Corpus,
        );
        assert!(matches!(unloaded, Err(EnrichError::FeatureNotLoaded { .. })));
    }
}
