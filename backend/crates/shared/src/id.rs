//! Common ID Types
//!
//! Type-safe, length-typed nanoid wrappers for domain identifiers.
//!
//! Identifiers are drawn from the 64-symbol URL-safe alphabet (`A-Za-z0-9_-`),
//! so every symbol carries 6 bits of entropy. There is no collision retry:
//! the lengths below are an accepted-risk choice, not a uniqueness guarantee.
//!
//! | Id | Symbols | Bits | ~50% collision after |
//! |---|---|---|---|
//! | [`FeedbackId`] | 10 | 60 | ~1.1e9 ids |
//! | [`SessionSuffix`] | 6 | 36 | ~3.1e5 ids per feedback id |
//!
//! Session suffixes only need to be unique among the live sessions of one
//! feedback record within the session TTL, which keeps them short.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use nid::Nanoid;

/// Symbols in a feedback id
pub const FEEDBACK_ID_LEN: usize = 10;

/// Symbols in a session-key suffix
pub const SESSION_SUFFIX_LEN: usize = 6;

/// Mint a fresh random identifier of `N` symbols
///
/// Usage:
/// ```
/// let id = kernel::id::new_id::<8>();
/// assert_eq!(id.as_str().len(), 8);
/// ```
#[inline]
pub fn new_id<const N: usize>() -> Nanoid<N> {
    Nanoid::new()
}

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type TicketId = Id<markers::Feedback, 12>;
/// let id = TicketId::new();
/// assert_eq!(id.as_str().len(), 12);
/// ```
pub struct Id<T, const N: usize> {
    value: Nanoid<N>,
    _marker: PhantomData<fn() -> T>,
}

/// ID のパースエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier: expected {expected} URL-safe characters")]
pub struct IdParseError {
    pub expected: usize,
}

impl<T, const N: usize> Id<T, N> {
    /// Create a new random ID
    pub fn new() -> Self {
        Self::from_nanoid(new_id::<N>())
    }

    /// Wrap an existing nanoid
    pub fn from_nanoid(value: Nanoid<N>) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Parse from its string form
    pub fn parse_str(s: &str) -> Result<Self, IdParseError> {
        Nanoid::<N>::from_str(s)
            .map(Self::from_nanoid)
            .map_err(|_| IdParseError { expected: N })
    }

    pub fn as_str(&self) -> &str {
        self.value.as_str()
    }
}

impl<T, const N: usize> Clone for Id<T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize> Copy for Id<T, N> {}

impl<T, const N: usize> PartialEq for Id<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T, const N: usize> Eq for Id<T, N> {}

impl<T, const N: usize> Hash for Id<T, N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T, const N: usize> Default for Id<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> FromStr for Id<T, N> {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl<T, const N: usize> fmt::Debug for Id<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.as_str())
    }
}

impl<T, const N: usize> fmt::Display for Id<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T, const N: usize> serde::Serialize for Id<T, N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, T, const N: usize> serde::Deserialize<'de> for Id<T, N> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// Marker types for different entity IDs
pub mod markers {
    /// Marker for feedback record IDs
    pub struct Feedback;

    /// Marker for session-key suffixes
    pub struct SessionSuffix;
}

/// Type aliases for common IDs
pub type FeedbackId = Id<markers::Feedback, FEEDBACK_ID_LEN>;
pub type SessionSuffix = Id<markers::SessionSuffix, SESSION_SUFFIX_LEN>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_lengths() {
        assert_eq!(FeedbackId::new().as_str().len(), FEEDBACK_ID_LEN);
        assert_eq!(SessionSuffix::new().as_str().len(), SESSION_SUFFIX_LEN);
    }

    #[test]
    fn test_id_alphabet_is_url_safe() {
        for _ in 0..50 {
            let id = FeedbackId::new();
            assert!(
                id.as_str()
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            );
        }
    }

    #[test]
    fn test_id_parse_roundtrip() {
        let id = FeedbackId::new();
        let parsed: FeedbackId = id.as_str().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_parse_rejects_wrong_length() {
        assert!(FeedbackId::parse_str("abc").is_err());
        assert!(SessionSuffix::parse_str("abcdefg").is_err());
    }

    #[test]
    fn test_id_parse_rejects_bad_symbols() {
        assert!(FeedbackId::parse_str("../../etc/").is_err());
        assert!(SessionSuffix::parse_str("ab cd!").is_err());
    }

    #[test]
    fn test_id_serde_as_plain_string() {
        let id = FeedbackId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: FeedbackId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<FeedbackId>("\"short\"").is_err());
    }

    #[test]
    fn test_ids_are_distinct() {
        let a = FeedbackId::new();
        let b = FeedbackId::new();
        assert_ne!(a, b);
    }
}
