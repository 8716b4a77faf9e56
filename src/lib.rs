//! Echo Metrics - Analytics engine for personal data exports
//!
//! Echo turns loosely structured export JSON into normalized statistics
//! through two independent, deterministic pipelines:
//!
//! ## Modules
//!
//! - **Conversation Analytics**: chat export → normalization → per-participant
//!   message counts, response latencies and sentiment averages
//! - **Follow Graph**: followers/following exports → username extraction and
//!   relationship counting → two-way set difference

pub mod conversation;
pub mod error;
pub mod graph;
pub mod sentiment;
pub mod store;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use conversation::{analyze_conversation, ConversationAnalyzer, ConversationSummary};
pub use error::{ComputeError, Result};
pub use graph::{diff_follow_graph, FollowGraphDiff, FollowGraphDiffer, Username};
pub use sentiment::{AfinnScorer, SentimentScorer};
pub use store::{AnalysisListing, AnalysisRecord, AnalysisStore};

/// Echo version
pub const ECHO_VERSION: &str = env!("CARGO_PKG_VERSION");
