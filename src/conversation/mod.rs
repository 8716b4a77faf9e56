//! Conversation analytics module
//!
//! This module processes a two-person chat export and computes per-participant
//! message counts, response latencies and sentiment averages.
//!
//! Pipeline: Conversation JSON → Normalizer → Metrics Engine → Summary

pub mod metrics;
pub mod normalizer;
pub mod pipeline;
pub mod types;

pub use pipeline::{analyze_conversation, ConversationAnalyzer};
pub use types::{
    ConversationSummary, ConversationTotals, NormalizedMessage, ParticipantMetrics,
    ParticipantPair,
};
