use crate::metadata::MetadataKey;

/// Constants describing the enrichment file layout.
pub mod enrichment {
    /// Field delimiter used by both the exporter and the importer.
    pub const DELIMITER: u8 = b'\t';
    /// Placeholder written into the annotation column on export.
    pub const BLANK_ANNOTATION: &str = "";
    /// Header row, in column order.
    pub const HEADER: [&str; 5] = [
        "location",
        "identifier",
        "rendered_text",
        "annotation_value",
        "context_text",
    ];
    /// Column holding the location label.
    pub const COL_LOCATION: usize = 0;
    /// Column holding the node identifier.
    pub const COL_IDENTIFIER: usize = 1;
    /// Column holding the rendered object text.
    pub const COL_TEXT: usize = 2;
    /// Column holding the user-supplied annotation.
    pub const COL_ANNOTATION: usize = 3;
    /// Column holding the rendered context unit.
    pub const COL_CONTEXT: usize = 4;
    /// Minimum columns an imported row needs (everything up to the annotation).
    ///
    /// Spreadsheet editors tend to drop trailing empty cells, so the context
    /// column is not required on import.
    pub const MIN_IMPORT_COLUMNS: usize = COL_ANNOTATION + 1;
}

/// Constants for the bundled corpus model.
pub mod corpus {
    /// Default object type of slot nodes.
    pub const DEFAULT_SLOT_TYPE: &str = "word";
    /// Pseudo-feature name that exposes node object types.
    pub const OTYPE_FEATURE: &str = "otype";
    /// Text format used when callers do not name one.
    pub const DEFAULT_TEXT_FORMAT: &str = "text-orig-full";
    /// Default section object types (book, chapter, verse).
    pub const DEFAULT_SECTION_TYPES: [&str; 3] = ["book", "chapter", "verse"];
    /// Default features carrying section headings (book, chapter, verse).
    pub const DEFAULT_SECTION_FEATURES: [&str; 3] = ["book", "chapter", "verse"];
}

/// Constants for persisted feature layers.
pub mod layers {
    use super::MetadataKey;

    /// File extension of persisted node-feature files.
    pub const LAYER_EXTENSION: &str = "tf";
    /// First header line of a node-feature file.
    pub const NODE_MARKER: &str = "@node";
    /// Prefix of every header line.
    pub const HEADER_PREFIX: char = '@';
    /// Metadata key for the value type tag.
    pub const META_VALUE_TYPE: MetadataKey = MetadataKey::new("valueType");
    /// Metadata key for free-text provenance.
    pub const META_SOURCE: MetadataKey = MetadataKey::new("source");
    /// Metadata key for the author.
    pub const META_AUTHOR: MetadataKey = MetadataKey::new("author");
    /// Metadata key naming the writing tool.
    pub const META_WRITTEN_BY: MetadataKey = MetadataKey::new("writtenBy");
    /// Metadata key holding the write timestamp.
    pub const META_DATE_WRITTEN: MetadataKey = MetadataKey::new("dateWritten");
    /// Tool signature stored under `writtenBy`.
    pub const WRITTEN_BY: &str = concat!("fabric-enrich ", env!("CARGO_PKG_VERSION"));
    /// Maximum number of unknown node ids echoed in a mismatch error.
    pub const MISMATCH_SAMPLE_LIMIT: usize = 10;
    /// Most nodes one data line of a layer file may address.
    pub const MAX_NODES_PER_LINE: u64 = 10_000_000;
}
