//! Process settings read from the environment at startup

use platform::config::{ConfigError, env_choice, env_opt, env_or, env_required};
use platform::llm::AnthropicConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Local,
    Blob,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Memory,
    Kv,
}

/// Remote blob service credentials
#[derive(Debug, Clone)]
pub struct BlobSettings {
    pub api_url: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub storage: StorageKind,
    pub data_dir: PathBuf,
    /// Present only when `storage` is [`StorageKind::Blob`]
    pub blob: Option<BlobSettings>,
    pub sessions: SessionKind,
    pub max_sessions: usize,
    pub session_ttl_secs: u64,
    pub feedback_ttl_days: u64,
    pub llm: AnthropicConfig,
}

pub const DEFAULT_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage = env_choice(
            "STORAGE_BACKEND",
            StorageKind::Local,
            &[("local", StorageKind::Local), ("blob", StorageKind::Blob)],
        )?;
        let blob = match storage {
            StorageKind::Local => None,
            StorageKind::Blob => Some(BlobSettings {
                api_url: env_or("BLOB_API_URL", "https://blob.vercel-storage.com".to_string())?,
                token: env_required("BLOB_READ_WRITE_TOKEN")?,
            }),
        };

        let llm_defaults = AnthropicConfig::default();
        let llm = AnthropicConfig {
            api_key: env_required("ANTHROPIC_API_KEY")?,
            base_url: env_or("ANTHROPIC_BASE_URL", llm_defaults.base_url)?,
            model: env_or("LLM_MODEL", llm_defaults.model)?,
            timeout: Duration::from_secs(env_or("LLM_TIMEOUT_SECS", 60u64)?),
            ..llm_defaults
        };

        Ok(Self {
            bind_addr: env_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 31113)))?,
            frontend_origins: parse_origins(
                &env_opt("FRONTEND_ORIGINS").unwrap_or_else(|| DEFAULT_ORIGINS.to_string()),
            ),
            storage,
            data_dir: PathBuf::from(env_or("DATA_DIR", "./data".to_string())?),
            blob,
            sessions: env_choice(
                "SESSION_STORE",
                SessionKind::Memory,
                &[("memory", SessionKind::Memory), ("kv", SessionKind::Kv)],
            )?,
            max_sessions: env_or("MAX_SESSIONS", 1000usize)?,
            session_ttl_secs: env_or("SESSION_TTL_SECS", 3600u64)?,
            feedback_ttl_days: env_or("FEEDBACK_TTL_DAYS", 30u64)?,
            llm,
        })
    }
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(parse_origins(DEFAULT_ORIGINS).len(), 2);
    }
}
