use fabric_enrich::example_apps::{demo_feature_table, sample_corpus};
use fabric_enrich::stats::{
    GlossSource, book_names, chapter_glance, chapter_verses, count_values, distinct_values,
    gender_profile,
};
use fabric_enrich::{CorpusBuilder, CorpusContext, EnrichError};

#[test]
fn the_same_query_runs_against_two_corpus_kinds() {
    let table = demo_feature_table();
    let greek = sample_corpus().unwrap();
    let mut hebrew = CorpusBuilder::new("hebrew-mini");
    for gender in ["m", "f", "m"] {
        hebrew.add_slot_with(&[("gn", gender)]);
    }
    let book = hebrew.add_node("book", 1..=3);
    let chapter = hebrew.add_node("chapter", 1..=3);
    hebrew
        .set_feature("book", book, "Genesis")
        .set_feature("chapter", chapter, "1");
    let hebrew = hebrew.build().unwrap();

    let g = CorpusContext::new("greek", &greek, &table);
    let h = CorpusContext::new("hebrew", &hebrew, &table);

    let greek_values = distinct_values(&g, "gender", "word").unwrap();
    assert!(greek_values.contains(&Some("Masculine".to_string())));
    assert!(greek_values.contains(&None));
    let hebrew_counts = count_values(&h, "gender", "word").unwrap();
    assert_eq!(hebrew_counts.get(&Some("m".to_string())), Some(&2));

    assert_eq!(book_names(&g), vec!["Jude"]);
    assert_eq!(book_names(&h), vec!["Genesis"]);

    let greek_profile = gender_profile(&g, "gender", "Jude").unwrap();
    let hebrew_profile = gender_profile(&h, "gender", "Genesis").unwrap();
    assert_eq!(greek_profile[0].words, 14);
    assert!((greek_profile[0].masculine - 600.0 / 14.0).abs() < 1e-9);
    assert!((hebrew_profile[0].masculine - 200.0 / 3.0).abs() < 1e-9);
}

#[test]
fn glance_and_verses_on_the_sample() {
    let table = demo_feature_table();
    let corpus = sample_corpus().unwrap();
    let ctx = CorpusContext::new("greek", &corpus, &table);

    let glance = chapter_glance(
        &ctx,
        "Jude",
        1,
        &GlossSource::Word {
            feature: "UnicodeLemma".into(),
        },
    )
    .unwrap();
    assert_eq!(glance[0], (Some("καί".to_string()), 2));
    assert_eq!(glance.len(), 13);

    let verses = chapter_verses(&ctx, "Jude", 1, "text-orig-full").unwrap();
    assert_eq!(verses.len(), 2);
    assert_eq!(verses[0].1, "Ἰούδας Ἰησοῦ Χριστοῦ δοῦλος, ἀδελφὸς δὲ Ἰακώβου");
    assert!(verses[1].1.ends_with("πληθυνθείη."));
}

#[test]
fn unresolvable_lookups_are_errors() {
    let table = demo_feature_table();
    let corpus = sample_corpus().unwrap();
    let hebrew_view = CorpusContext::new("hebrew", &corpus, &table);
    assert!(matches!(
        count_values(&hebrew_view, "gender", "word"),
        Err(EnrichError::FeatureNotLoaded { .. })
    ));
    let latin_view = CorpusContext::new("latin", &corpus, &table);
    assert!(matches!(
        gender_profile(&latin_view, "gender", "Jude"),
        Err(EnrichError::UnknownFeatureAlias { .. })
    ));
    let greek = CorpusContext::new("greek", &corpus, &table);
    assert!(matches!(
        chapter_glance(&greek, "Jude", 2, &GlossSource::Word { feature: "UnicodeLemma".into() }),
        Err(EnrichError::UnknownSection { .. })
    ));
}
