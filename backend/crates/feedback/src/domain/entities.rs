//! Domain Entities
//!
//! Core business entities for the feedback relay.

use chrono::{DateTime, Utc};
use kernel::id::FeedbackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One conversation turn, shared with the LLM gateway
pub use platform::llm::{ChatMessage as Turn, Role};

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn ttl_ms(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

/// Optional context supplied by the sender at submit time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personalization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

impl Personalization {
    pub fn new(
        sender_name: Option<String>,
        recipient_name: Option<String>,
        relationship: Option<String>,
    ) -> Self {
        Self {
            sender_name,
            recipient_name,
            relationship,
        }
        .normalized()
    }

    /// Trim every field and drop the blank ones
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            sender_name: clean(self.sender_name),
            recipient_name: clean(self.recipient_name),
            relationship: clean(self.relationship),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sender_name.is_none() && self.recipient_name.is_none() && self.relationship.is_none()
    }
}

/// FeedbackRecord entity - a submitted piece of feedback
///
/// Raw and sanitized text are written together in one object and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: FeedbackId,
    pub raw_feedback: String,
    pub sanitized_feedback: String,
    #[serde(flatten)]
    pub personalization: Personalization,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "expiresAt")]
    pub expires_at_ms: i64,
}

impl FeedbackRecord {
    /// Create a new record under a fresh id
    pub fn new(
        raw_feedback: String,
        sanitized_feedback: String,
        personalization: Personalization,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: FeedbackId::new(),
            raw_feedback,
            sanitized_feedback,
            personalization,
            created_at: now,
            expires_at_ms: now.timestamp_millis().saturating_add(ttl_ms(ttl)),
        }
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }

    /// Check if the record has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_ms())
    }

    pub fn metadata(&self) -> FeedbackMetadata {
        FeedbackMetadata {
            id: self.id,
            created_at: self.created_at,
            personalization: self.personalization.clone(),
        }
    }

    pub fn into_sanitized(self) -> SanitizedFeedback {
        SanitizedFeedback {
            text: self.sanitized_feedback,
            personalization: self.personalization,
        }
    }
}

/// Public view of a record: never carries either text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMetadata {
    pub id: FeedbackId,
    pub created_at: DateTime<Utc>,
    pub personalization: Personalization,
}

/// What a transform needs from a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedFeedback {
    pub text: String,
    pub personalization: Personalization,
}

/// SessionRecord entity - the turn history of one conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub key: String,
    pub turns: Vec<Turn>,
    #[serde(rename = "lastTouchedAt")]
    pub last_touched_at_ms: i64,
    #[serde(rename = "expiresAt")]
    pub expires_at_ms: i64,
}

impl SessionRecord {
    /// Snapshot `turns` under `key`, expiring `ttl` from now
    pub fn new(key: String, turns: Vec<Turn>, ttl: Duration) -> Self {
        let now = now_ms();
        Self {
            key,
            turns,
            last_touched_at_ms: now,
            expires_at_ms: now.saturating_add(ttl_ms(ttl)),
        }
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_ms())
    }
}

/// Presence and note for one element of a feedback draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementAssessment {
    #[serde(default)]
    pub present: bool,
    #[serde(default)]
    pub detail: String,
}

/// Situation-Behavior-Impact breakdown, plus an optional request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityElements {
    #[serde(default)]
    pub situation: ElementAssessment,
    #[serde(default)]
    pub behavior: ElementAssessment,
    #[serde(default)]
    pub impact: ElementAssessment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ElementAssessment>,
}

/// Coaching assessment of a draft before it is sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAnalysis {
    /// 1 to 10
    pub overall_score: u8,
    pub elements: QualityElements,
    pub suggestions: Vec<String>,
}

impl QualityAnalysis {
    pub const NEUTRAL_SCORE: u8 = 5;

    /// Neutral result returned when no real analysis is available
    pub fn neutral() -> Self {
        Self {
            overall_score: Self::NEUTRAL_SCORE,
            elements: QualityElements::default(),
            suggestions: vec![
                "Describe the situation and the specific behavior, then the impact it had.".to_string(),
            ],
        }
    }
}
