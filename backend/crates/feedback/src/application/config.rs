//! Application Configuration
//!
//! Configuration for the feedback application layer.

use std::time::Duration;

/// Feedback application configuration
#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    /// Lifetime of a submitted feedback record
    pub feedback_ttl: Duration,
    /// Sliding lifetime of a conversation
    pub session_ttl: Duration,
    /// Capacity of the in-memory session store
    pub max_sessions: usize,
    /// Max chars of a draft sent to sanitize / analyze
    pub max_draft_chars: usize,
    /// Max chars of each text stored on submit
    pub max_stored_chars: usize,
    /// Max chars of each personalization field
    pub max_name_chars: usize,
    /// Max chars of a transform request
    pub max_format_chars: usize,
    /// Output token budgets
    pub sanitize_max_tokens: u32,
    pub transform_max_tokens: u32,
    pub analyze_max_tokens: u32,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            feedback_ttl: Duration::from_secs(30 * 24 * 3600),
            session_ttl: Duration::from_secs(3600),
            max_sessions: 1000,
            max_draft_chars: 10_000,
            max_stored_chars: 50_000,
            max_name_chars: 100,
            max_format_chars: 10_000,
            sanitize_max_tokens: 1024,
            transform_max_tokens: 2048,
            analyze_max_tokens: 512,
        }
    }
}

impl FeedbackConfig {
    pub fn with_feedback_ttl_days(mut self, days: u64) -> Self {
        self.feedback_ttl = Duration::from_secs(days.saturating_mul(24 * 3600));
        self
    }

    pub fn with_session_ttl_secs(mut self, secs: u64) -> Self {
        self.session_ttl = Duration::from_secs(secs);
        self
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_ttl_days_saturates() {
        let config = FeedbackConfig::default().with_feedback_ttl_days(u64::MAX);
        assert_eq!(config.feedback_ttl, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_feedback_ttl_days() {
        let config = FeedbackConfig::default().with_feedback_ttl_days(2);
        assert_eq!(config.feedback_ttl, Duration::from_secs(172_800));
    }
}
