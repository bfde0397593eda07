//! Plain-text node-feature codec.
//!
//! Layout:
//!
//! ```text
//! @node
//! @author=J.S. Bach, Leipzig
//! @valueType=str
//!
//! 102	plural
//! singular
//! ```
//!
//! Header lines are sorted by key and end at the first blank line. A data
//! line is either `nodes<TAB>value` or a bare `value` for the node after the
//! previous one. `nodes` is a comma list of ids and `a-b` ranges.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::constants::layers::{
    HEADER_PREFIX, MAX_NODES_PER_LINE, META_DATE_WRITTEN, META_WRITTEN_BY, NODE_MARKER,
    WRITTEN_BY,
};
use crate::corpus::layers::{FeatureLayer, FeatureMeta};
use crate::errors::EnrichError;
use crate::metadata::{format_timestamp, header_line, parse_header_line};
use crate::types::NodeId;
use crate::utils::{escape_value, unescape_value};

/// Encode `layer` as a node-feature file stamped with `written_at`.
///
/// Output depends only on the layer and the timestamp.
pub fn encode_layer(layer: &FeatureLayer, written_at: DateTime<Utc>) -> String {
    let mut entries = layer.meta.entries();
    entries.insert(META_WRITTEN_BY.as_str().to_string(), WRITTEN_BY.to_string());
    entries.insert(
        META_DATE_WRITTEN.as_str().to_string(),
        format_timestamp(written_at),
    );

    let mut out = String::new();
    out.push_str(NODE_MARKER);
    out.push('\n');
    for (key, value) in &entries {
        out.push_str(&header_line(key, &escape_value(value)));
        out.push('\n');
    }
    out.push('\n');

    let mut previous: Option<NodeId> = None;
    for (node, value) in &layer.values {
        let implicit = match previous {
            Some(prev) => prev.checked_add(1) == Some(*node),
            None => *node == 1,
        };
        // Empty values always carry their node so they are not read back as gaps.
        if implicit && !value.is_empty() {
            out.push_str(&escape_value(value));
        } else {
            out.push_str(&node.to_string());
            out.push('\t');
            out.push_str(&escape_value(value));
        }
        out.push('\n');
        previous = Some(*node);
    }
    out
}

/// Decode a node-feature file into a layer named `name`.
///
/// `path` is only used for diagnostics.
pub fn decode_layer(path: &Path, name: &str, text: &str) -> Result<FeatureLayer, EnrichError> {
    let malformed = |line: usize, reason: String| EnrichError::LayerFormat {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut lines = text.lines().enumerate().map(|(idx, line)| (idx + 1, line));
    match lines.next() {
        Some((_, first)) if first.trim_end() == NODE_MARKER => {}
        Some((line, first)) if first.starts_with(HEADER_PREFIX) => {
            return Err(malformed(
                line,
                format!("unsupported layer kind '{}', expected {NODE_MARKER}", first.trim_end()),
            ));
        }
        Some((line, _)) => {
            return Err(malformed(line, format!("missing {NODE_MARKER} header")));
        }
        None => return Err(malformed(0, "empty layer file".into())),
    }

    let mut entries = BTreeMap::new();
    for (line, raw) in lines.by_ref() {
        if raw.trim().is_empty() {
            break;
        }
        let (key, value) = parse_header_line(raw)
            .ok_or_else(|| malformed(line, format!("malformed header line '{raw}'")))?;
        entries.insert(key.to_string(), unescape_value(value));
    }
    let meta = FeatureMeta::from_entries(entries).map_err(|reason| malformed(1, reason))?;

    let mut values = BTreeMap::new();
    // None once the implicit node counter has passed NodeId::MAX.
    let mut next: Option<NodeId> = Some(1);
    let implicit = |next: Option<NodeId>, line: usize| {
        next.ok_or_else(|| malformed(line, "implicit node id exceeds the node id range".into()))
    };
    for (line, raw) in lines {
        if raw.is_empty() {
            next = implicit(next, line)?.checked_add(1);
            continue;
        }
        match raw.split_once('\t') {
            Some((nodes_part, value)) => {
                let nodes = parse_node_list(nodes_part).map_err(|reason| malformed(line, reason))?;
                let value = unescape_value(value);
                for &node in &nodes {
                    values.insert(node, value.clone());
                }
                if let Some(&last) = nodes.last() {
                    next = last.checked_add(1);
                }
            }
            None => {
                let node = implicit(next, line)?;
                values.insert(node, unescape_value(raw));
                next = node.checked_add(1);
            }
        }
    }

    Ok(FeatureLayer::new(name, meta, values))
}

/// Parse `1,4-6,9` into `[1, 4, 5, 6, 9]`.
fn parse_node_list(list: &str) -> Result<Vec<NodeId>, String> {
    let mut nodes = Vec::new();
    for part in list.split(',') {
        let part = part.trim();
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_node(start)?;
                let end = parse_node(end)?;
                if end < start {
                    return Err(format!("descending node range '{part}'"));
                }
                let span = end - start;
                if span >= MAX_NODES_PER_LINE.saturating_sub(nodes.len() as u64) {
                    return Err(format!(
                        "node range '{part}' exceeds {MAX_NODES_PER_LINE} nodes per line"
                    ));
                }
                nodes.extend(start..=end);
            }
            None => nodes.push(parse_node(part)?),
        }
    }
    Ok(nodes)
}

fn parse_node(raw: &str) -> Result<NodeId, String> {
    match raw.trim().parse::<NodeId>() {
        Ok(0) => Err("node 0 is not a valid node".into()),
        Ok(node) => Ok(node),
        Err(_) => Err(format!("invalid node '{raw}'")),
    }
}
