//! Domain Value Objects

use kernel::id::{FEEDBACK_ID_LEN, FeedbackId, SESSION_SUFFIX_LEN, SessionSuffix};
use std::fmt;

/// Key of one conversation about one feedback record: `{feedbackId}-{suffix}`
///
/// A key is only meaningful under the feedback id it embeds; a caller can
/// never resume a conversation that belongs to a different record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    feedback_id: FeedbackId,
    suffix: SessionSuffix,
}

/// Rejected session key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("conversation id is malformed or belongs to another feedback record")]
pub struct SessionKeyError;

impl SessionKey {
    /// Total length of the string form
    pub const LEN: usize = FEEDBACK_ID_LEN + 1 + SESSION_SUFFIX_LEN;

    /// Mint a fresh key under `feedback_id`
    pub fn new(feedback_id: FeedbackId) -> Self {
        Self {
            feedback_id,
            suffix: SessionSuffix::new(),
        }
    }

    /// Parse a caller-supplied key and check it is namespaced under `feedback_id`
    pub fn parse_for(feedback_id: &FeedbackId, raw: &str) -> Result<Self, SessionKeyError> {
        if raw.len() != Self::LEN {
            return Err(SessionKeyError);
        }
        let (prefix, rest) = raw.split_at_checked(FEEDBACK_ID_LEN).ok_or(SessionKeyError)?;
        let suffix = rest.strip_prefix('-').ok_or(SessionKeyError)?;
        if prefix != feedback_id.as_str() {
            return Err(SessionKeyError);
        }
        let suffix = SessionSuffix::parse_str(suffix).map_err(|_| SessionKeyError)?;
        Ok(Self {
            feedback_id: *feedback_id,
            suffix,
        })
    }

    pub fn feedback_id(&self) -> &FeedbackId {
        &self.feedback_id
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.feedback_id, self.suffix)
    }
}

/// Rate limit category of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Submit,
    Sanitize,
    Analyze,
    Transform,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Submit => "submit",
            Category::Sanitize => "sanitize",
            Category::Analyze => "analyze",
            Category::Transform => "transform",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
