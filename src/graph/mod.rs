//! Follow graph module
//!
//! This module compares a followers export with a following export and
//! reports who does not follow back in either direction.
//!
//! Pipeline: Export JSON → Walker → Extractor + Counter → Differ → Diff

pub mod counter;
pub mod differ;
pub mod extractor;
pub mod pipeline;
pub mod types;
pub mod walker;

pub use pipeline::{diff_follow_graph, FollowGraphDiffer};
pub use types::{FollowGraphDiff, FollowList, GraphOptions, Username, DEFAULT_MAX_DEPTH};
