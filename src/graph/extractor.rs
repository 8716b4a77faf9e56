//! Username extraction from follow-list exports
//!
//! Export formats nest relationship records at varying depths and carry the
//! handle in different places depending on the export version. Each entry of
//! a record is tried against an ordered list of strategies; the record title
//! is a last resort applied once per record.

use crate::error::Result;
use crate::graph::types::{relationship_entries, GraphOptions, Username};
use crate::graph::walker::walk_objects;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use url::Url;

/// Path segment that prefixes a handle in some profile links
const USER_PATH_PREFIX: &str = "_u";

/// Where a single `string_list_data` entry may carry a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStrategy {
    /// The entry's explicit `value` field
    Value,
    /// A handle parsed from the entry's `href` profile link
    Href,
}

/// Strategies tried in order for every entry; the first hit wins
pub const ENTRY_STRATEGIES: [EntryStrategy; 2] = [EntryStrategy::Value, EntryStrategy::Href];

impl EntryStrategy {
    pub fn extract(self, entry: &Value) -> Option<Username> {
        match self {
            EntryStrategy::Value => entry.get("value").and_then(Username::from_value),
            EntryStrategy::Href => entry
                .get("href")
                .and_then(Value::as_str)
                .and_then(username_from_href),
        }
    }
}

/// Extractor collecting normalized usernames from an export tree
#[derive(Debug, Clone, Default)]
pub struct UsernameExtractor {
    options: GraphOptions,
}

impl UsernameExtractor {
    pub fn new(options: GraphOptions) -> Self {
        Self { options }
    }

    /// Collect every username in `tree`.
    ///
    /// Fails only when the tree is nested deeper than the configured limit.
    pub fn extract(&self, tree: &Value) -> Result<BTreeSet<Username>> {
        let mut usernames = BTreeSet::new();
        walk_objects(tree, self.options.max_depth, |node| {
            usernames.extend(extract_record(node));
        })?;
        Ok(usernames)
    }
}

/// Usernames carried by a single node; empty unless it is a relationship record
pub fn extract_record(node: &Map<String, Value>) -> Vec<Username> {
    let Some(entries) = relationship_entries(node) else {
        return Vec::new();
    };

    let found: Vec<Username> = entries
        .iter()
        .filter_map(|entry| {
            ENTRY_STRATEGIES
                .iter()
                .find_map(|strategy| strategy.extract(entry))
        })
        .collect();

    if !found.is_empty() {
        return found;
    }

    node.get("title")
        .and_then(Username::from_value)
        .into_iter()
        .collect()
}

/// Parse a handle out of a profile link.
///
/// The first non-empty path segment is the handle, except for `/_u/<handle>`
/// links. Relative or unparseable links and links with an empty path yield
/// `None`. Opaque paths such as `mailto:` addresses count as one segment.
pub fn username_from_href(href: &str) -> Option<Username> {
    if href.trim().is_empty() {
        return None;
    }

    let url = Url::parse(href).ok()?;
    let segments: Vec<&str> = url
        .path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.as_slice() {
        [] => None,
        [prefix, handle, ..] if *prefix == USER_PATH_PREFIX => Username::parse(handle),
        [first, ..] => Username::parse(first),
    }
}
