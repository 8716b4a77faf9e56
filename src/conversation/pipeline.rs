//! Conversation pipeline orchestration
//!
//! This module provides the public API for conversation analytics.
//! It orchestrates the full pipeline from a chat export payload to a summary.

use crate::conversation::metrics::ConversationMetricsEngine;
use crate::conversation::normalizer::ConversationNormalizer;
use crate::conversation::types::ConversationSummary;
use crate::error::{ComputeError, Result};
use crate::sentiment::{AfinnScorer, SentimentScorer};
use crate::store::{AnalysisRecord, AnalysisStore};
use serde_json::Value;

/// Analyze a conversation payload (`{participants, messages}`).
///
/// Fails with [`ComputeError::InsufficientParticipants`] when fewer than two
/// usable participant names exist; every other defect degrades to empty or
/// zero metrics.
///
/// # Example
/// ```ignore
/// let summary = analyze_conversation(&payload, &AfinnScorer::new())?;
/// ```
pub fn analyze_conversation<S: SentimentScorer + ?Sized>(
    conversation: &Value,
    scorer: &S,
) -> Result<ConversationSummary> {
    // Stage 1: Participants
    let participants =
        ConversationNormalizer::normalize_participants(conversation.get("participants"));
    let participants: [String; 2] = participants
        .try_into()
        .map_err(|_| ComputeError::InsufficientParticipants)?;

    // Stage 2: Messages
    let messages =
        ConversationNormalizer::normalize_messages(conversation.get("messages"), &participants);

    // Stage 3: Metrics
    ConversationMetricsEngine::derive(participants, &messages, scorer)
}

/// Conversation analyzer bound to a sentiment scorer.
///
/// The scorer is an explicit dependency so tests and embedders can swap it.
pub struct ConversationAnalyzer<S = AfinnScorer> {
    scorer: S,
}

impl Default for ConversationAnalyzer<AfinnScorer> {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationAnalyzer<AfinnScorer> {
    /// Create an analyzer using the embedded AFINN lexicon
    pub fn new() -> Self {
        Self::with_scorer(AfinnScorer::new())
    }
}

impl<S: SentimentScorer> ConversationAnalyzer<S> {
    /// Create an analyzer with a custom scorer
    pub fn with_scorer(scorer: S) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Analyze a parsed conversation payload
    pub fn analyze(&self, conversation: &Value) -> Result<ConversationSummary> {
        analyze_conversation(conversation, &self.scorer)
    }

    /// Analyze a conversation JSON string and return summary JSON
    pub fn analyze_json(&self, conversation_json: &str) -> Result<String> {
        let conversation: Value = serde_json::from_str(conversation_json)?;
        let summary = self.analyze(&conversation)?;
        Ok(serde_json::to_string(&summary)?)
    }

    /// Analyze a conversation and append the result to `store`.
    ///
    /// The payload must be a JSON object. `file_name` defaults to
    /// `messages.json` when absent or blank.
    pub fn analyze_and_record<'a>(
        &self,
        store: &'a mut AnalysisStore,
        file_name: Option<&str>,
        conversation: Value,
    ) -> Result<&'a AnalysisRecord> {
        if !conversation.is_object() {
            return Err(ComputeError::InvalidPayload(
                "Expected a conversation object.".to_string(),
            ));
        }

        let summary = self.analyze(&conversation)?;
        Ok(store.insert(file_name, summary, conversation))
    }
}
