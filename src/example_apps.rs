use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum, error::ErrorKind};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;

use crate::config::{EnrichConfig, ExportOptions, ImportPolicy, PersistOptions};
use crate::constants::corpus::DEFAULT_TEXT_FORMAT;
use crate::constants::enrichment::{COL_ANNOTATION, COL_IDENTIFIER, DELIMITER};
use crate::context::{CorpusContext, FeatureNameTable};
use crate::corpus::{
    CorpusBuilder, CorpusProvider, DirLayerStore, FeatureMeta, InMemoryCorpus, SectionRef,
    ValueType,
};
use crate::errors::EnrichError;
use crate::export::export_selection;
use crate::import::import_enrichment;
use crate::persist::persist_feature;
use crate::roundtrip::EnrichmentSession;
use crate::select::{ObjectPredicate, Scope, select};
use crate::stats::{
    GlossSource, book_names, chapter_glance, chapter_verses, count_values, gender_profile,
};
use crate::types::{FeatureName, FeatureValue, NodeId};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ValueTypeArg {
    Str,
    Int,
}

impl From<ValueTypeArg> for ValueType {
    fn from(value: ValueTypeArg) -> Self {
        match value {
            ValueTypeArg::Str => ValueType::Str,
            ValueTypeArg::Int => ValueType::Int,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "enrichment_demo",
    disable_help_subcommand = true,
    about = "Export, annotate, import, and persist corpus feature layers",
    long_about = "Select corpus objects, write them to a TAB-delimited enrichment file, read the annotations back, and save them as a new feature layer.",
    after_help = "Without --corpus a small built-in sample (Jude 1:1-2) is used. Set RUST_LOG=debug for detailed logs."
)]
/// CLI for `enrichment_demo`.
///
/// Common usage:
/// - Write a file to annotate: `export --out np.tsv --where Cat=np`
/// - Preview what would be imported: `import --file np.tsv`
/// - Save the annotations: `persist --file np.tsv --feature semNumber --store layers/`
/// - Run the whole loop unattended: `roundtrip --dir /tmp/run --fill 21=plural`
struct EnrichmentDemoCli {
    #[arg(
        long,
        value_name = "PATH",
        global = true,
        help = "JSON corpus snapshot to load instead of the built-in sample"
    )]
    corpus: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Print reports as JSON instead of plain text"
    )]
    json: bool,
    #[command(subcommand)]
    command: DemoCommand,
}

#[derive(Debug, Subcommand)]
enum DemoCommand {
    /// Write an enrichment file for the selected objects.
    Export(ExportArgs),
    /// Read an annotated enrichment file and report the mapping.
    Import(ImportArgs),
    /// Import an annotated file and save it as a feature layer.
    Persist(PersistArgs),
    /// Export, fill, import, persist, and reload in one go.
    Roundtrip(RoundtripArgs),
    /// Print exploratory statistics for the corpus.
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
struct SelectionArgs {
    #[arg(long, default_value = "phrase", help = "Object type to select")]
    otype: String,
    #[arg(
        long = "where",
        value_name = "FEATURE=VALUE",
        value_parser = parse_pair::<FeatureName, FeatureValue>,
        help = "Feature condition, repeat to require several"
    )]
    conditions: Vec<(FeatureName, FeatureValue)>,
    #[arg(long, help = "Restrict to one book")]
    book: Option<String>,
    #[arg(long, requires = "book", help = "Restrict to one chapter of --book")]
    chapter: Option<u32>,
    #[arg(long, requires = "chapter", help = "Restrict to one verse of --chapter")]
    verse: Option<u32>,
    #[arg(long, default_value = DEFAULT_TEXT_FORMAT, help = "Text format for rendered columns")]
    format: String,
    #[arg(long, default_value = "sentence", help = "Object type rendered into the context column")]
    context: String,
}

impl SelectionArgs {
    fn predicate(&self) -> ObjectPredicate {
        self.conditions
            .iter()
            .fold(ObjectPredicate::new(self.otype.clone()), |predicate, (feature, value)| {
                predicate.with_feature(feature.clone(), value.clone())
            })
    }

    fn scope(&self) -> Scope {
        match (&self.book, self.chapter, self.verse) {
            (Some(book), Some(chapter), Some(verse)) => {
                Scope::Section(SectionRef::verse(book.clone(), chapter, verse))
            }
            (Some(book), Some(chapter), None) => {
                Scope::Section(SectionRef::chapter(book.clone(), chapter))
            }
            (Some(book), None, _) => Scope::Section(SectionRef::book(book.clone())),
            (None, _, _) => Scope::Corpus,
        }
    }

    fn export_options(&self) -> ExportOptions {
        ExportOptions::default()
            .with_text_format(self.format.clone())
            .with_context_type(self.context.clone())
    }
}

#[derive(Debug, Args)]
struct ExportArgs {
    #[arg(long, value_name = "PATH", help = "Enrichment file to write")]
    out: PathBuf,
    #[command(flatten)]
    selection: SelectionArgs,
}

#[derive(Debug, Args)]
struct ImportArgs {
    #[arg(long, value_name = "PATH", help = "Annotated enrichment file")]
    file: PathBuf,
    #[arg(long, help = "Fail on the first malformed row instead of skipping it")]
    strict: bool,
}

#[derive(Debug, Args)]
struct LayerArgs {
    #[arg(long, help = "Name of the new feature layer")]
    feature: String,
    #[arg(long, value_name = "DIR", help = "Directory holding feature layer files")]
    store: PathBuf,
    #[arg(long, value_enum, default_value = "str", help = "Declared value type")]
    value_type: ValueTypeArg,
    #[arg(long, default_value = "", help = "Provenance recorded in the layer metadata")]
    source: String,
    #[arg(long, default_value = "", help = "Author recorded in the layer metadata")]
    author: String,
    #[arg(long, help = "Replace an existing layer with the same name")]
    overwrite: bool,
}

impl LayerArgs {
    fn meta(&self) -> FeatureMeta {
        FeatureMeta::new(self.value_type.into(), self.source.clone(), self.author.clone())
    }
}

#[derive(Debug, Args)]
struct PersistArgs {
    #[arg(long, value_name = "PATH", help = "Annotated enrichment file")]
    file: PathBuf,
    #[arg(long, help = "Fail on the first malformed row instead of skipping it")]
    strict: bool,
    #[command(flatten)]
    layer: LayerArgs,
}

#[derive(Debug, Args)]
struct RoundtripArgs {
    #[arg(long, value_name = "DIR", help = "Working directory for the enrichment file")]
    dir: PathBuf,
    #[arg(
        long,
        value_name = "ID=VALUE",
        value_parser = parse_pair::<NodeId, FeatureValue>,
        help = "Annotation to fill in before importing, repeat as needed"
    )]
    fill: Vec<(NodeId, FeatureValue)>,
    #[command(flatten)]
    selection: SelectionArgs,
    #[command(flatten)]
    layer: LayerArgs,
}

#[derive(Debug, Args)]
struct StatsArgs {
    #[arg(long, default_value = "greek", help = "Corpus kind used to resolve feature names")]
    kind: String,
    #[arg(long, default_value = "gender", help = "Concept counted by the gender profile")]
    concept: String,
    #[arg(long, help = "Book to profile (defaults to the first book)")]
    book: Option<String>,
    #[arg(long, default_value_t = 1, help = "Chapter for the glance and verse listing")]
    chapter: u32,
    #[arg(long, default_value = "UnicodeLemma", help = "Word feature used as gloss")]
    gloss: String,
    #[arg(long, value_name = "OTYPE", help = "Read the gloss from this enclosing object type")]
    gloss_from: Option<String>,
}

pub fn run_enrichment_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<EnrichmentDemoCli, _>(
        std::iter::once("enrichment_demo".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut corpus = match &cli.corpus {
        Some(path) => InMemoryCorpus::from_json_file(path)?,
        None => sample_corpus()?,
    };

    match cli.command {
        DemoCommand::Export(args) => {
            let selection = select(&corpus, &args.selection.predicate(), &args.selection.scope())?;
            if selection.is_empty() {
                println!("Selection is empty; writing a header-only file.");
            }
            let summary = export_selection(
                &corpus,
                &selection,
                &args.selection.export_options(),
                &args.out,
            )?;
            emit(cli.json, &summary, || {
                println!("wrote {} row(s) to {}", summary.rows, summary.path.display());
            })?;
        }
        DemoCommand::Import(args) => {
            let report = import_enrichment(&args.file, policy(args.strict))?;
            emit(cli.json, &report, || {
                println!(
                    "rows: {}  annotated: {}  blank: {}  skipped: {}",
                    report.rows_read,
                    report.mapping.len(),
                    report.blank_rows,
                    report.skipped.len()
                );
                for (node, value) in &report.mapping {
                    println!("  {node:>6}  {value}");
                }
                for row in &report.skipped {
                    eprintln!("  skipped line {}: {}", row.line, row.reason);
                }
            })?;
        }
        DemoCommand::Persist(args) => {
            let report = import_enrichment(&args.file, policy(args.strict))?;
            let store = DirLayerStore::open(&args.layer.store)?;
            let options = PersistOptions::default().with_overwrite(args.layer.overwrite);
            let persisted = persist_feature(
                &corpus,
                &store,
                &args.layer.feature,
                &report.mapping,
                args.layer.meta(),
                &options,
            )?;
            emit(cli.json, &persisted, || {
                println!(
                    "saved '{}' ({} node(s)) to {}{}",
                    persisted.feature,
                    persisted.nodes,
                    persisted.location,
                    if persisted.replaced { ", replacing the previous layer" } else { "" }
                );
            })?;
        }
        DemoCommand::Roundtrip(args) => run_roundtrip(&mut corpus, &args, cli.json)?,
        DemoCommand::Stats(args) => print_stats(&corpus, &args, cli.json)?,
    }

    Ok(())
}

fn run_roundtrip(
    corpus: &mut InMemoryCorpus,
    args: &RoundtripArgs,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.dir)?;
    let path = args.dir.join(format!("{}.tsv", args.layer.feature));
    let store = DirLayerStore::open(&args.layer.store)?;
    let config = EnrichConfig::default()
        .with_export(args.selection.export_options())
        .with_persist(PersistOptions::default().with_overwrite(args.layer.overwrite));

    let persisted = {
        let mut session = EnrichmentSession::select(
            &*corpus,
            &args.selection.predicate(),
            &args.selection.scope(),
            config,
        )?;
        session.export(&path)?;
        fill_annotations(&path, &args.fill)?;
        session.import()?;
        session.persist(&store, &args.layer.feature, args.layer.meta())?
    };

    corpus.load_features(&store, &[args.layer.feature.as_str()])?;
    let mut reloaded = Vec::with_capacity(args.fill.len());
    for (node, _) in &args.fill {
        reloaded.push((*node, corpus.feature_value(&args.layer.feature, *node)?));
    }

    emit(json, &persisted, || {
        println!(
            "round trip complete: '{}' saved with {} node(s) in {}",
            persisted.feature, persisted.nodes, persisted.location
        );
        for (node, value) in &reloaded {
            println!("  {node:>6}  {}", value.unwrap_or("<none>"));
        }
    })?;
    Ok(())
}

/// Stand-in for a human editing the exported file in a spreadsheet.
fn fill_annotations(path: &Path, fills: &[(NodeId, FeatureValue)]) -> Result<(), Box<dyn Error>> {
    let rows: Vec<StringRecord> = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_path(path)?
        .into_records()
        .collect::<Result<_, _>>()?;
    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .quote_style(QuoteStyle::Necessary)
        .flexible(true)
        .from_path(path)?;
    for row in rows {
        let fill = row
            .get(COL_IDENTIFIER)
            .and_then(|raw| raw.trim().parse::<NodeId>().ok())
            .and_then(|node| fills.iter().find(|(target, _)| *target == node));
        match fill {
            Some((_, value)) if row.len() > COL_ANNOTATION => {
                let filled: StringRecord = row
                    .iter()
                    .enumerate()
                    .map(|(idx, cell)| if idx == COL_ANNOTATION { value.as_str() } else { cell })
                    .collect();
                writer.write_record(&filled)?;
            }
            _ => writer.write_record(&row)?,
        }
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct StatsReport {
    books: Vec<String>,
    counts: Vec<(Option<FeatureValue>, usize)>,
    profile: Vec<crate::stats::ChapterGenderShare>,
    glance: Vec<(Option<FeatureValue>, usize)>,
    verses: Vec<(u32, String)>,
}

fn print_stats(
    corpus: &InMemoryCorpus,
    args: &StatsArgs,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let table = demo_feature_table();
    let ctx = CorpusContext::new(&args.kind, corpus, &table);
    let books = book_names(&ctx);
    let Some(book) = args.book.clone().or_else(|| books.first().cloned()) else {
        println!("Corpus '{}' has no books.", corpus.id());
        return Ok(());
    };
    let gloss = match &args.gloss_from {
        Some(otype) => GlossSource::Enclosing {
            otype: otype.clone(),
            feature: args.gloss.clone(),
        },
        None => GlossSource::Word {
            feature: args.gloss.clone(),
        },
    };
    let report = StatsReport {
        counts: count_values(&ctx, &args.concept, corpus.slot_type())?
            .into_iter()
            .collect(),
        profile: gender_profile(&ctx, &args.concept, &book)?,
        glance: chapter_glance(&ctx, &book, args.chapter, &gloss)?,
        verses: chapter_verses(&ctx, &book, args.chapter, DEFAULT_TEXT_FORMAT)?,
        books,
    };

    emit(json, &report, || {
        println!("=== {} ({}) ===", corpus.id(), args.kind);
        println!("books: {}", report.books.join(", "));
        println!();
        println!("[{} VALUES]", args.concept.to_uppercase());
        for (value, count) in &report.counts {
            println!("  {:>6}  {}", count, value.as_deref().unwrap_or("<none>"));
        }
        println!();
        println!("[{} PROFILE: {}]", args.concept.to_uppercase(), book);
        for share in &report.profile {
            println!(
                "  ch {:>3}  words {:>5}  m {:>5.1}%  f {:>5.1}%  n {:>5.1}%  absent {:>5.1}%",
                share.chapter,
                share.words,
                share.masculine,
                share.feminine,
                share.neuter,
                share.absent
            );
        }
        println!();
        println!("[AT A GLANCE: {} {}]", book, args.chapter);
        for (gloss, count) in &report.glance {
            println!("  {:>3} {}", count, gloss.as_deref().unwrap_or("<none>"));
        }
        println!();
        println!("[IN DEPTH: {} {}]", book, args.chapter);
        for (verse, text) in &report.verses {
            println!("  {verse}: {text}");
        }
    })?;
    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T, plain: impl FnOnce()) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        plain();
    }
    Ok(())
}

fn policy(strict: bool) -> ImportPolicy {
    if strict {
        ImportPolicy::Strict
    } else {
        ImportPolicy::SkipAndWarn
    }
}

/// Feature names of the demo concepts for Hebrew and Greek corpora.
pub fn demo_feature_table() -> FeatureNameTable {
    FeatureNameTable::new()
        .with_alias("gender", "hebrew", "gn")
        .with_alias("gender", "greek", "Gender")
        .with_alias("lemma", "hebrew", "lex")
        .with_alias("lemma", "greek", "UnicodeLemma")
}

/// Jude 1:1-2 with words, verses, sentences, and phrases.
///
/// Node ids: words 1-14, book 15, chapter 16, verses 17-18, sentences
/// 19-20, phrases 21-25.
pub fn sample_corpus() -> Result<InMemoryCorpus, EnrichError> {
    const WORDS: [(&str, &str, Option<&str>, &str); 14] = [
        ("Ἰούδας", " ", Some("Masculine"), "Ἰούδας"),
        ("Ἰησοῦ", " ", Some("Masculine"), "Ἰησοῦς"),
        ("Χριστοῦ", " ", Some("Masculine"), "Χριστός"),
        ("δοῦλος", ", ", Some("Masculine"), "δοῦλος"),
        ("ἀδελφὸς", " ", Some("Masculine"), "ἀδελφός"),
        ("δὲ", " ", None, "δέ"),
        ("Ἰακώβου", " ", Some("Masculine"), "Ἰάκωβος"),
        ("ἔλεος", " ", Some("Neuter"), "ἔλεος"),
        ("ὑμῖν", " ", None, "σύ"),
        ("καὶ", " ", None, "καί"),
        ("εἰρήνη", " ", Some("Feminine"), "εἰρήνη"),
        ("καὶ", " ", None, "καί"),
        ("ἀγάπη", " ", Some("Feminine"), "ἀγάπη"),
        ("πληθυνθείη", ". ", None, "πληθύνω"),
    ];

    let mut builder = CorpusBuilder::new("sample-jude")
        .with_format(DEFAULT_TEXT_FORMAT, "{text}{trailer}")
        .with_format("lex-orig-plain", "{UnicodeLemma} ");
    for (text, trailer, gender, lemma) in WORDS {
        let word = builder.add_slot_with(&[
            ("text", text),
            ("trailer", trailer),
            ("UnicodeLemma", lemma),
        ]);
        if let Some(gender) = gender {
            builder.set_feature("Gender", word, gender);
        }
    }
    let book = builder.add_node("book", 1..=14);
    let chapter = builder.add_node("chapter", 1..=14);
    let verse1 = builder.add_node("verse", 1..=7);
    let verse2 = builder.add_node("verse", 8..=14);
    builder.add_node("sentence", 1..=7);
    builder.add_node("sentence", 8..=14);
    let phrases = [
        (builder.add_node("phrase", 1..=4), "np"),
        (builder.add_node("phrase", 5..=7), "np"),
        (builder.add_node("phrase", [8, 10, 11, 12, 13]), "np"),
        (builder.add_node("phrase", [9]), "np"),
        (builder.add_node("phrase", [14]), "vp"),
    ];
    builder
        .set_feature("book", book, "Jude")
        .set_feature("chapter", chapter, "1")
        .set_feature("verse", verse1, "1")
        .set_feature("verse", verse2, "2");
    for (phrase, cat) in phrases {
        builder.set_feature("Cat", phrase, cat);
    }
    builder.build()
}

fn parse_pair<K, V>(raw: &str) -> Result<(K, V), String>
where
    K: std::str::FromStr,
    V: std::str::FromStr,
{
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key
        .trim()
        .parse()
        .map_err(|_| format!("invalid key '{}'", key.trim()))?;
    let value = value
        .parse()
        .map_err(|_| format!("invalid value '{value}'"))?;
    Ok((key, value))
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::LayerStore;
    use tempfile::tempdir;

    fn run(args: &[&str]) -> Result<(), Box<dyn Error>> {
        run_enrichment_demo(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn sample_corpus_has_documented_layout() {
        let corpus = sample_corpus().unwrap();
        assert_eq!(corpus.max_slot(), 14);
        assert_eq!(corpus.nodes_of_type("phrase"), vec![21, 22, 23, 24, 25]);
        assert_eq!(corpus.location_label(23).as_deref(), Some("Jude 1:2"));
        assert_eq!(
            corpus.render_text(&[21], DEFAULT_TEXT_FORMAT).unwrap(),
            "Ἰούδας Ἰησοῦ Χριστοῦ δοῦλος, "
        );
    }

    #[test]
    fn parse_pair_splits_on_first_equals() {
        assert_eq!(
            parse_pair::<String, String>("Cat=np=x").unwrap(),
            ("Cat".to_string(), "np=x".to_string())
        );
        assert_eq!(parse_pair::<NodeId, String>("21=plural").unwrap(), (21, "plural".to_string()));
        assert!(parse_pair::<NodeId, String>("abc=plural").is_err());
        assert!(parse_pair::<String, String>("missing").is_err());
    }

    #[test]
    fn selection_args_build_nested_scopes() {
        let cli = EnrichmentDemoCli::try_parse_from([
            "enrichment_demo",
            "export",
            "--out",
            "x.tsv",
            "--where",
            "Cat=np",
            "--book",
            "Jude",
            "--chapter",
            "1",
        ])
        .unwrap();
        let DemoCommand::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.selection.scope(), Scope::Section(SectionRef::chapter("Jude", 1)));
        assert_eq!(
            args.selection.predicate(),
            ObjectPredicate::new("phrase").with_feature("Cat", "np")
        );
    }

    #[test]
    fn help_is_not_an_error() {
        run(&["--help"]).unwrap();
    }

    #[test]
    fn roundtrip_command_persists_filled_values() {
        let temp = tempdir().unwrap();
        let work = temp.path().join("work");
        let layers = temp.path().join("layers");
        run(&[
            "roundtrip",
            "--dir",
            work.to_str().unwrap(),
            "--store",
            layers.to_str().unwrap(),
            "--feature",
            "semNumber",
            "--where",
            "Cat=np",
            "--fill",
            "22=plural",
        ])
        .unwrap();

        let store = DirLayerStore::open(&layers).unwrap();
        let layer = store.load_layer("semNumber").unwrap().unwrap();
        assert_eq!(layer.values.len(), 1);
        assert_eq!(layer.get(22), Some("plural"));
    }

    #[test]
    fn export_then_persist_commands_share_files() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("np.tsv");
        let layers = temp.path().join("layers");
        run(&["export", "--out", file.to_str().unwrap(), "--where", "Cat=np"]).unwrap();
        fill_annotations(&file, &[(21, "singular".to_string())]).unwrap();
        run(&["import", "--file", file.to_str().unwrap(), "--json"]).unwrap();
        run(&[
            "persist",
            "--file",
            file.to_str().unwrap(),
            "--store",
            layers.to_str().unwrap(),
            "--feature",
            "semNumber",
        ])
        .unwrap();

        let again = run(&[
            "persist",
            "--file",
            file.to_str().unwrap(),
            "--store",
            layers.to_str().unwrap(),
            "--feature",
            "semNumber",
        ]);
        assert!(again.is_err());
    }

    #[test]
    fn filled_values_with_delimiters_stay_in_their_column() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("np.tsv");
        run(&["export", "--out", file.to_str().unwrap(), "--where", "Cat=np"]).unwrap();
        fill_annotations(&file, &[(22, "a\tb".to_string()), (23, "plural".to_string())]).unwrap();

        let report = import_enrichment(&file, ImportPolicy::Strict).unwrap();
        assert_eq!(report.mapping.get(&22).map(String::as_str), Some("a\tb"));
        assert_eq!(report.mapping.get(&23).map(String::as_str), Some("plural"));
        assert_eq!(report.mapping.len(), 2);
    }

    #[test]
    fn stats_command_runs_on_the_sample() {
        run(&["stats"]).unwrap();
        run(&["stats", "--json", "--chapter", "1"]).unwrap();
        assert!(run(&["stats", "--kind", "latin"]).is_err());
    }
}
