//! Conversation data types
//!
//! This module defines the normalized messages and summary types that flow
//! through the conversation analytics pipeline.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// A message that survived normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMessage {
    /// One of the two accepted participant names
    pub sender: String,
    /// Millisecond epoch timestamp
    pub timestamp_ms: i64,
    /// Text content, absent when the raw content was not a string
    pub content: Option<String>,
}

/// A value per participant, keyed by display name.
///
/// Always holds exactly two entries in participant order. Serializes as a
/// JSON object whose keys follow that order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantPair<T> {
    entries: [(String, T); 2],
}

impl<T> ParticipantPair<T> {
    pub fn new(first: (String, T), second: (String, T)) -> Self {
        Self {
            entries: [first, second],
        }
    }

    /// Build a pair with the same starting value for both participants
    pub fn filled(names: &[String; 2], value: T) -> Self
    where
        T: Clone,
    {
        Self::new(
            (names[0].clone(), value.clone()),
            (names[1].clone(), value),
        )
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Transform every value, keeping names and order
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> ParticipantPair<U> {
        let [(first_name, first), (second_name, second)] = &self.entries;
        ParticipantPair::new(
            (first_name.clone(), f(first)),
            (second_name.clone(), f(second)),
        )
    }
}

impl<T: Serialize> Serialize for ParticipantPair<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct ParticipantPairVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ParticipantPairVisitor<T> {
    type Value = ParticipantPair<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map with exactly two participant entries")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, T)> = Vec::with_capacity(2);
        while let Some((name, value)) = access.next_entry::<String, T>()? {
            if entries.iter().any(|(existing, _)| *existing == name) {
                return Err(de::Error::custom(format!("duplicate participant `{}`", name)));
            }
            entries.push((name, value));
        }

        let len = entries.len();
        let entries: [(String, T); 2] = entries
            .try_into()
            .map_err(|_| <A::Error as de::Error>::invalid_length(len, &self))?;
        Ok(ParticipantPair { entries })
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ParticipantPair<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ParticipantPairVisitor(PhantomData))
    }
}

/// Conversation-wide totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTotals {
    pub total_messages: u64,
}

/// Per-participant metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantMetrics {
    /// Normalized messages sent by each participant
    pub message_counts: ParticipantPair<u64>,
    /// Mean minutes taken to reply to the other participant (0 when never replied)
    pub average_response_minutes: ParticipantPair<f64>,
    /// Mean non-zero sentiment score (0 when no message scored)
    pub average_sentiment: ParticipantPair<f64>,
}

/// Result of analyzing one conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// Accepted participants in first-seen order
    pub participants: [String; 2],
    pub totals: ConversationTotals,
    pub metrics: ParticipantMetrics,
}
