//! Conversation metrics derivation
//!
//! Computes per-participant message counts, response latencies and sentiment
//! averages from a normalized, time-ordered message set.

use crate::conversation::types::{
    ConversationSummary, ConversationTotals, NormalizedMessage, ParticipantMetrics,
    ParticipantPair,
};
use crate::error::Result;
use crate::sentiment::{checked_score, SentimentScorer};

/// Milliseconds per minute
const MS_PER_MINUTE: f64 = 60_000.0;

/// Running sum and sample count for one participant
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Accumulator {
    total: f64,
    count: u64,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        average(self.total, self.count)
    }
}

/// Metrics engine for normalized conversations
pub struct ConversationMetricsEngine;

impl ConversationMetricsEngine {
    /// Derive the summary for two participants and their normalized messages.
    ///
    /// Messages from anyone other than `participants` are ignored. Scoring
    /// happens in message order; the first scorer error aborts the analysis.
    pub fn derive<S: SentimentScorer + ?Sized>(
        participants: [String; 2],
        messages: &[NormalizedMessage],
        scorer: &S,
    ) -> Result<ConversationSummary> {
        let mut message_counts = ParticipantPair::filled(&participants, 0u64);
        let mut sentiment = ParticipantPair::filled(&participants, Accumulator::default());
        let mut total_messages = 0u64;

        for message in messages {
            let Some(count) = message_counts.get_mut(&message.sender) else {
                continue;
            };
            *count += 1;
            total_messages += 1;

            if let Some(score) = score_content(message, scorer)? {
                if let Some(acc) = sentiment.get_mut(&message.sender) {
                    acc.push(score);
                }
            }
        }

        let mut latencies = ParticipantPair::filled(&participants, Accumulator::default());
        for (sender, minutes) in compute_response_minutes(messages) {
            if let Some(acc) = latencies.get_mut(sender) {
                acc.push(minutes);
            }
        }

        Ok(ConversationSummary {
            participants,
            totals: ConversationTotals { total_messages },
            metrics: ParticipantMetrics {
                message_counts,
                average_response_minutes: latencies.map(Accumulator::mean),
                average_sentiment: sentiment.map(Accumulator::mean),
            },
        })
    }
}

/// Score a message's content.
///
/// Returns `None` for missing or empty content and for neutral (zero)
/// scores, which stay out of the average's denominator.
fn score_content<S: SentimentScorer + ?Sized>(
    message: &NormalizedMessage,
    scorer: &S,
) -> Result<Option<f64>> {
    let Some(content) = message.content.as_deref().filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    let score = checked_score(scorer, content)?;
    Ok((score != 0.0).then_some(score))
}

/// Response latencies in minutes, attributed to the replying sender.
///
/// A sample is taken at every sender change between consecutive messages.
/// Negative deltas are dropped.
fn compute_response_minutes(messages: &[NormalizedMessage]) -> Vec<(&str, f64)> {
    messages
        .windows(2)
        .filter(|pair| pair[0].sender != pair[1].sender)
        .map(|pair| {
            let delta_ms = pair[1].timestamp_ms.saturating_sub(pair[0].timestamp_ms);
            (pair[1].sender.as_str(), delta_ms as f64 / MS_PER_MINUTE)
        })
        .filter(|&(_, minutes)| minutes >= 0.0)
        .collect()
}

/// Arithmetic mean; 0 for an empty sample
pub fn average(total: f64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    total / count as f64
}
