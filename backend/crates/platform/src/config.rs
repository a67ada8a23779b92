//! Environment configuration helpers
//!
//! Thin wrappers over `std::env` used by the binary at startup. Values are
//! read once; nothing here is consulted per request.

use std::str::FromStr;

/// Configuration error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

/// Read a variable, treating empty strings as unset
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a required variable
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env_opt(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

/// Read and parse a variable, using `default` when unset
///
/// A value that is set but does not parse is an error rather than a silent
/// fallback.
pub fn env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    parse_or(key, env_opt(key), default)
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value,
        }),
    }
}

/// Parse a variable into one of a fixed set of lowercase choices
pub fn env_choice<T>(key: &str, default: T, choices: &[(&str, T)]) -> Result<T, ConfigError>
where
    T: Copy,
{
    match env_opt(key) {
        None => Ok(default),
        Some(value) => choices
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&value))
            .map(|(_, choice)| *choice)
            .ok_or(ConfigError::Invalid {
                key: key.to_string(),
                value,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_default_when_unset() {
        assert_eq!(parse_or::<u64>("X", None, 7).unwrap(), 7);
    }

    #[test]
    fn test_parse_or_parses_value() {
        assert_eq!(parse_or::<u64>("X", Some("42".into()), 7).unwrap(), 42);
    }

    #[test]
    fn test_parse_or_rejects_garbage() {
        let err = parse_or::<u64>("MAX_SESSIONS", Some("lots".into()), 7).unwrap_err();
        assert!(err.to_string().contains("MAX_SESSIONS"));
    }

    #[test]
    fn test_env_choice_default_for_unset_key() {
        let picked = env_choice(
            "PLATFORM_TEST_SURELY_UNSET_KEY",
            "memory",
            &[("memory", "memory"), ("kv", "kv")],
        )
        .unwrap();
        assert_eq!(picked, "memory");
    }

    #[test]
    fn test_env_required_missing() {
        let err = env_required("PLATFORM_TEST_SURELY_UNSET_KEY").unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }
}
