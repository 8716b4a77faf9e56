//! Follow graph pipeline orchestration
//!
//! Public API for comparing a followers export with a following export.

use crate::error::{ComputeError, Result};
use crate::graph::counter::RelationshipCounter;
use crate::graph::differ::GraphDiffer;
use crate::graph::extractor::UsernameExtractor;
use crate::graph::types::{FollowGraphDiff, FollowList, GraphOptions};
use serde_json::Value;

/// Compare two export payloads with default traversal limits (stateless, one-shot).
///
/// Fails with [`ComputeError::MissingPayload`] if either payload is absent or
/// JSON-falsy (`null`, `false`, `0`, `""`). Malformed sub-structures
/// contribute nothing instead of failing.
pub fn diff_follow_graph(
    followers: Option<&Value>,
    following: Option<&Value>,
) -> Result<FollowGraphDiff> {
    FollowGraphDiffer::default().diff(followers, following)
}

/// Follow graph differ with configurable traversal limits
#[derive(Debug, Clone, Default)]
pub struct FollowGraphDiffer {
    extractor: UsernameExtractor,
    counter: RelationshipCounter,
}

impl FollowGraphDiffer {
    pub fn new(options: GraphOptions) -> Self {
        Self {
            extractor: UsernameExtractor::new(options),
            counter: RelationshipCounter::new(options),
        }
    }

    /// Create a differ refusing trees nested deeper than `max_depth`
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self::new(GraphOptions { max_depth })
    }

    /// Extract usernames and unit count from one export tree
    pub fn follow_list(&self, tree: &Value) -> Result<FollowList> {
        Ok(FollowList {
            usernames: self.extractor.extract(tree)?,
            relationship_units: self.counter.count_units(tree)?,
        })
    }

    pub fn diff(
        &self,
        followers: Option<&Value>,
        following: Option<&Value>,
    ) -> Result<FollowGraphDiff> {
        let (followers, following) = match (present(followers), present(following)) {
            (Some(followers), Some(following)) => (followers, following),
            _ => {
                return Err(ComputeError::MissingPayload(
                    "Expected followers and following JSON payloads.".to_string(),
                ))
            }
        };

        let followers = self.follow_list(followers)?;
        let following = self.follow_list(following)?;
        Ok(GraphDiffer::diff(&followers, &following))
    }

    /// Compare two export JSON strings and return diff JSON
    pub fn diff_json(&self, followers_json: &str, following_json: &str) -> Result<String> {
        let followers: Value = serde_json::from_str(followers_json)?;
        let following: Value = serde_json::from_str(following_json)?;
        let diff = self.diff(Some(&followers), Some(&following))?;
        Ok(serde_json::to_string(&diff)?)
    }
}

/// `None` for absent or JSON-falsy payloads
fn present(payload: Option<&Value>) -> Option<&Value> {
    payload.filter(|value| match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}
