//! Relationship unit counting
//!
//! Counts raw relationship records in an export tree. Unlike the username
//! set, this total keeps duplicates and records that yield no handle.

use crate::error::Result;
use crate::graph::types::{relationship_entries, GraphOptions};
use crate::graph::walker::walk_objects;
use serde_json::Value;

/// Counter for relationship records in an export tree
#[derive(Debug, Clone, Default)]
pub struct RelationshipCounter {
    options: GraphOptions,
}

impl RelationshipCounter {
    pub fn new(options: GraphOptions) -> Self {
        Self { options }
    }

    /// Count every relationship record in `tree`, nested records included
    pub fn count_units(&self, tree: &Value) -> Result<u64> {
        let mut units = 0u64;
        walk_objects(tree, self.options.max_depth, |node| {
            if relationship_entries(node).is_some() {
                units += 1;
            }
        })?;
        Ok(units)
    }
}
