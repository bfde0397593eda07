use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Display;

use crate::constants::layers::HEADER_PREFIX;

/// Separator between a metadata key and its value (for example `valueType=str`).
pub const METADATA_DELIMITER: &str = "=";

/// Canonical identifier for layer metadata fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetadataKey {
    name: &'static str,
}

impl MetadataKey {
    /// Create a metadata key with a canonical static name.
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// Return the raw key name.
    pub const fn as_str(&self) -> &'static str {
        self.name
    }

    /// Encode a value using the shared delimiter (e.g., "valueType=str").
    pub fn encode(&self, value: impl Display) -> String {
        format!("{}{}{}", self.name, METADATA_DELIMITER, value)
    }

    /// Strip the field prefix from a serialized metadata entry.
    pub fn strip<'a>(&self, entry: &'a str) -> Option<&'a str> {
        entry
            .strip_prefix(self.name)
            .and_then(|rest| rest.strip_prefix(METADATA_DELIMITER))
    }
}

/// Encode an arbitrary key/value pair as a layer header line (`@key=value`).
pub fn header_line(key: &str, value: &str) -> String {
    format!("{HEADER_PREFIX}{key}{METADATA_DELIMITER}{value}")
}

/// Split a layer header line into key and value.
///
/// Returns `None` for lines without the `@` prefix or the delimiter.
pub fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    line.strip_prefix(HEADER_PREFIX)?
        .split_once(METADATA_DELIMITER)
}

/// Format a timestamp the way layer headers store it (RFC 3339, seconds, `Z`).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
