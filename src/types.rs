/// Stable corpus object identifier (slots first, then larger units).
/// Examples: `1` (first word), `101` (a phrase)
pub type NodeId = u64;
/// Object type name of a corpus node.
/// Examples: `word`, `phrase`, `sentence`, `chapter`, `book`
pub type ObjectType = String;
/// Name of a feature layer.
/// Examples: `Cat`, `gn`, `Gender`, `semNumber`
pub type FeatureName = String;
/// Value stored for one node in a feature layer.
/// Examples: `np`, `Masculine`, `plural`
pub type FeatureValue = String;
/// Name of a text rendering format.
/// Examples: `text-orig-full`, `lex-orig-plain`
pub type FormatName = String;
/// Human-readable location of a node.
/// Examples: `Jude 1:3`, `Leviticus 18`
pub type LocationLabel = String;
/// Identifier for a kind of corpus, used to resolve feature aliases.
/// Examples: `hebrew`, `greek`
pub type CorpusKind = String;
/// Corpus-independent name for a feature concept.
/// Examples: `gender`, `lemma`
pub type FeatureConcept = String;
/// Book heading used in section references.
/// Examples: `Jude`, `Leviticus`
pub type BookName = String;
