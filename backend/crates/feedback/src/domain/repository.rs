//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entities::{FeedbackMetadata, FeedbackRecord, SanitizedFeedback, Turn};
use crate::domain::value_objects::SessionKey;
use crate::error::FeedbackResult;
use kernel::id::FeedbackId;

/// Durable feedback repository trait
///
/// Reads expire lazily: a record past its expiry is deleted on access and
/// reported as `None`, exactly like one that never existed.
#[trait_variant::make(FeedbackRepository: Send)]
pub trait LocalFeedbackRepository {
    /// Store a new record (raw and sanitized text in one write)
    async fn put(&self, record: &FeedbackRecord) -> FeedbackResult<()>;

    /// Public metadata of a live record
    async fn get_metadata(&self, id: &FeedbackId) -> FeedbackResult<Option<FeedbackMetadata>>;

    /// Sanitized text and personalization of a live record
    async fn get_sanitized(&self, id: &FeedbackId) -> FeedbackResult<Option<SanitizedFeedback>>;

    /// Delete a record (idempotent)
    async fn delete(&self, id: &FeedbackId) -> FeedbackResult<()>;
}

/// Conversation history repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Ordered turns of a session; empty when absent or expired
    async fn load(&self, key: &SessionKey) -> FeedbackResult<Vec<Turn>>;

    /// Replace the turns of a session and refresh its TTL
    async fn save(&self, key: &SessionKey, turns: &[Turn]) -> FeedbackResult<()>;
}
