//! Exploratory corpus statistics.
//!
//! Every function takes a `CorpusContext`, so the same call works against a
//! Hebrew and a Greek corpus side by side. Concept names (such as `gender`)
//! are resolved to corpus feature names through the context's table.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::CorpusContext;
use crate::corpus::SectionRef;
use crate::errors::EnrichError;
use crate::types::{BookName, FeatureName, FeatureValue, NodeId, ObjectType};
use crate::utils::normalize_inline_whitespace;

/// Occurrence count per value; `None` counts nodes without a value.
pub type ValueCounts = BTreeMap<Option<FeatureValue>, usize>;

/// Gender distribution of the words in one chapter, in percent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChapterGenderShare {
    /// Chapter number.
    pub chapter: u32,
    /// Words in the chapter.
    pub words: usize,
    /// Share marked masculine.
    pub masculine: f64,
    /// Share marked feminine.
    pub feminine: f64,
    /// Share marked neuter.
    pub neuter: f64,
    /// Share without a gender value (`NA`, `unknown`, or missing).
    pub absent: f64,
}

/// Where `chapter_glance` reads a word's gloss from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlossSource {
    /// A feature on the word itself (e.g., Greek `UnicodeLemma`).
    Word {
        /// Feature to read.
        feature: FeatureName,
    },
    /// A feature on the first enclosing object (e.g., Hebrew `lex` node `gloss`).
    Enclosing {
        /// Object type of the enclosing unit.
        otype: ObjectType,
        /// Feature to read on that unit.
        feature: FeatureName,
    },
}

impl GlossSource {
    fn feature(&self) -> &str {
        match self {
            Self::Word { feature } | Self::Enclosing { feature, .. } => feature,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GenderBucket {
    Masculine,
    Feminine,
    Neuter,
    Absent,
    Other,
}

fn gender_bucket(value: Option<&str>) -> GenderBucket {
    match value {
        Some("m" | "Masculine") => GenderBucket::Masculine,
        Some("f" | "Feminine") => GenderBucket::Feminine,
        Some("Neuter") => GenderBucket::Neuter,
        Some("NA" | "unknown") | None => GenderBucket::Absent,
        Some(_) => GenderBucket::Other,
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

/// Distinct values of `concept` over all objects of type `otype`.
pub fn distinct_values(
    ctx: &CorpusContext<'_>,
    concept: &str,
    otype: &str,
) -> Result<BTreeSet<Option<FeatureValue>>, EnrichError> {
    Ok(count_values(ctx, concept, otype)?.into_keys().collect())
}

/// Count the values of `concept` over all objects of type `otype`.
pub fn count_values(
    ctx: &CorpusContext<'_>,
    concept: &str,
    otype: &str,
) -> Result<ValueCounts, EnrichError> {
    let feature = ctx.feature_for(concept)?;
    let mut counts = ValueCounts::new();
    for node in ctx.corpus.nodes_of_type(otype) {
        let value = ctx.corpus.feature_value(feature, node)?;
        *counts.entry(value.map(str::to_string)).or_default() += 1;
    }
    debug!(
        corpus = %ctx.corpus.id(),
        feature = %feature,
        otype = %otype,
        distinct = counts.len(),
        "counted values"
    );
    Ok(counts)
}

/// Book headings in corpus order.
pub fn book_names(ctx: &CorpusContext<'_>) -> Vec<BookName> {
    let [book_type, _, _] = ctx.corpus.section_types();
    ctx.corpus
        .nodes_of_type(book_type)
        .into_iter()
        .filter_map(|node| ctx.corpus.section_of(node))
        .map(|section| section.book)
        .collect()
}

fn section_node(ctx: &CorpusContext<'_>, section: SectionRef) -> Result<NodeId, EnrichError> {
    ctx.corpus
        .node_from_section(&section)
        .ok_or_else(|| EnrichError::UnknownSection {
            corpus_id: ctx.corpus.id().to_string(),
            section: section.to_string(),
        })
}

/// Per-chapter gender shares of the words in `book`.
///
/// A chapter without words reports 0% in every bucket.
pub fn gender_profile(
    ctx: &CorpusContext<'_>,
    concept: &str,
    book: &str,
) -> Result<Vec<ChapterGenderShare>, EnrichError> {
    let feature = ctx.feature_for(concept)?;
    let book_node = section_node(ctx, SectionRef::book(book))?;
    let [_, chapter_type, _] = ctx.corpus.section_types();
    let slot_type = ctx.corpus.slot_type();

    let mut profile = Vec::new();
    for chapter_node in ctx.corpus.descendants(book_node, chapter_type) {
        let Some(chapter) = ctx.corpus.section_of(chapter_node).and_then(|s| s.chapter) else {
            continue;
        };
        let words = ctx.corpus.descendants(chapter_node, slot_type);
        let (mut masculine, mut feminine, mut neuter, mut absent) = (0, 0, 0, 0);
        for word in &words {
            match gender_bucket(ctx.corpus.feature_value(feature, *word)?) {
                GenderBucket::Masculine => masculine += 1,
                GenderBucket::Feminine => feminine += 1,
                GenderBucket::Neuter => neuter += 1,
                GenderBucket::Absent => absent += 1,
                GenderBucket::Other => {}
            }
        }
        let total = words.len();
        profile.push(ChapterGenderShare {
            chapter,
            words: total,
            masculine: percent(masculine, total),
            feminine: percent(feminine, total),
            neuter: percent(neuter, total),
            absent: percent(absent, total),
        });
    }
    Ok(profile)
}

/// Gloss frequencies of the words in one chapter, most frequent first.
///
/// Ties are ordered by gloss; words without a gloss count under `None`.
pub fn chapter_glance(
    ctx: &CorpusContext<'_>,
    book: &str,
    chapter: u32,
    source: &GlossSource,
) -> Result<Vec<(Option<FeatureValue>, usize)>, EnrichError> {
    if !ctx.corpus.has_feature(source.feature()) {
        return Err(EnrichError::FeatureNotLoaded {
            corpus_id: ctx.corpus.id().to_string(),
            feature: source.feature().to_string(),
        });
    }
    let chapter_node = section_node(ctx, SectionRef::chapter(book, chapter))?;

    let mut counts = ValueCounts::new();
    for word in ctx.corpus.descendants(chapter_node, ctx.corpus.slot_type()) {
        let gloss = match source {
            GlossSource::Word { feature } => ctx.corpus.feature_value(feature, word)?,
            GlossSource::Enclosing { otype, feature } => {
                match ctx.corpus.ancestors(word, otype).first() {
                    Some(unit) => ctx.corpus.feature_value(feature, *unit)?,
                    None => None,
                }
            }
        };
        *counts.entry(gloss.map(str::to_string)).or_default() += 1;
    }

    let mut glance: Vec<(Option<FeatureValue>, usize)> = counts.into_iter().collect();
    // stable sort: ties keep gloss order from the map
    glance.sort_by_key(|(_, count)| Reverse(*count));
    Ok(glance)
}

/// Number and rendered text of every verse in one chapter.
pub fn chapter_verses(
    ctx: &CorpusContext<'_>,
    book: &str,
    chapter: u32,
    format: &str,
) -> Result<Vec<(u32, String)>, EnrichError> {
    let chapter_node = section_node(ctx, SectionRef::chapter(book, chapter))?;
    let [_, _, verse_type] = ctx.corpus.section_types();

    let mut verses = Vec::new();
    for verse_node in ctx.corpus.descendants(chapter_node, verse_type) {
        let Some(number) = ctx.corpus.section_of(verse_node).and_then(|s| s.verse) else {
            continue;
        };
        let text = ctx.corpus.render_text(&[verse_node], format)?;
        verses.push((number, normalize_inline_whitespace(text)));
    }
    Ok(verses)
}
