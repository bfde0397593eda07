use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::constants::corpus::DEFAULT_TEXT_FORMAT;

/// Controls how selected objects are rendered into enrichment rows.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Text format used for both the object text and the context text.
    pub text_format: Cow<'static, str>,
    /// Object type of the enclosing unit rendered into the context column.
    pub context_type: Cow<'static, str>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            text_format: Cow::Borrowed(DEFAULT_TEXT_FORMAT),
            context_type: Cow::Borrowed("sentence"),
        }
    }
}

impl ExportOptions {
    /// Override the text format.
    pub fn with_text_format(mut self, format: impl Into<Cow<'static, str>>) -> Self {
        self.text_format = format.into();
        self
    }

    /// Override the context unit type.
    pub fn with_context_type(mut self, otype: impl Into<Cow<'static, str>>) -> Self {
        self.context_type = otype.into();
        self
    }
}

/// How the importer treats malformed rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportPolicy {
    /// Skip the row, record it in the report, and keep going.
    #[default]
    SkipAndWarn,
    /// Abort the whole import at the first malformed row.
    Strict,
}

/// Controls how a mapping is persisted as a feature layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct PersistOptions {
    /// Replace an existing layer with the same name.
    pub overwrite: bool,
}

impl PersistOptions {
    /// Opt in (or out) of replacing an existing same-named layer.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Top-level round-trip configuration.
#[derive(Clone, Debug, Default)]
pub struct EnrichConfig {
    /// Export rendering options.
    pub export: ExportOptions,
    /// Malformed-row handling on import.
    pub import_policy: ImportPolicy,
    /// Persistence behavior.
    pub persist: PersistOptions,
}

impl EnrichConfig {
    /// Replace export options.
    pub fn with_export(mut self, export: ExportOptions) -> Self {
        self.export = export;
        self
    }

    /// Replace the import policy.
    pub fn with_import_policy(mut self, policy: ImportPolicy) -> Self {
        self.import_policy = policy;
        self
    }

    /// Replace persistence options.
    pub fn with_persist(mut self, persist: PersistOptions) -> Self {
        self.persist = persist;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_lenient_and_non_destructive() {
        let config = EnrichConfig::default();
        assert_eq!(config.import_policy, ImportPolicy::SkipAndWarn);
        assert!(!config.persist.overwrite);
        assert_eq!(config.export.text_format, DEFAULT_TEXT_FORMAT);
        assert_eq!(config.export.context_type, "sentence");
    }

    #[test]
    fn builders_override_fields() {
        let config = EnrichConfig::default()
            .with_export(
                ExportOptions::default()
                    .with_text_format("text-orig-plain")
                    .with_context_type("verse"),
            )
            .with_import_policy(ImportPolicy::Strict)
            .with_persist(PersistOptions::default().with_overwrite(true));
        assert_eq!(config.export.text_format, "text-orig-plain");
        assert_eq!(config.export.context_type, "verse");
        assert_eq!(config.import_policy, ImportPolicy::Strict);
        assert!(config.persist.overwrite);
    }
}
