//! Follow graph data types

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Field marking an export node as a relationship record
pub const RELATIONSHIP_FIELD: &str = "string_list_data";

/// Default ceiling on export tree nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// A normalized handle: trimmed, lower-cased, never empty
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Normalize a raw handle; blank input yields `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        Some(Self(normalized))
    }

    /// Normalize a JSON value; only strings can carry a handle
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(Self::parse)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ComputeError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or_else(|| ComputeError::ParseError("empty username".to_string()))
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

/// Entries of a relationship record, if `node` is one.
///
/// A node is a relationship record when its `string_list_data` field is a
/// non-empty array.
pub fn relationship_entries(node: &Map<String, Value>) -> Option<&[Value]> {
    node.get(RELATIONSHIP_FIELD)
        .and_then(Value::as_array)
        .filter(|entries| !entries.is_empty())
        .map(Vec::as_slice)
}

/// Traversal limits for export trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphOptions {
    /// Deepest container nesting accepted (root is depth 0)
    pub max_depth: usize,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Usernames and raw relationship units extracted from one export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowList {
    pub usernames: BTreeSet<Username>,
    /// Relationship records counted with duplicates
    pub relationship_units: u64,
}

/// Two-way difference between a followers and a following export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowGraphDiff {
    pub total_followers: u64,
    pub total_following: u64,
    pub unique_followers: u64,
    pub unique_following: u64,
    pub not_following_back_count: u64,
    /// Accounts you follow that do not follow you
    pub not_following_back: Vec<Username>,
    pub you_dont_follow_back_count: u64,
    /// Accounts following you that you do not follow
    pub you_dont_follow_back: Vec<Username>,
}
