//! Anonymous Feedback Relay Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, composition rules, repository traits
//! - `application/` - Use cases
//! - `infra/` - Object store backends and session stores
//! - `presentation/` - HTTP handlers, rate limiting middleware, router
//!
//! ## Privacy Model
//! - Raw feedback is written once and never read back out
//! - The recipient and the model only ever see sanitized text
//! - Expired and never-existing records are indistinguishable to callers

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::FeedbackConfig;
pub use error::{FeedbackError, FeedbackResult};
pub use infra::backend::{SessionBackend, StorageBackend};
pub use infra::blob::{BlobConfig, BlobStore};
pub use infra::kv::KvStore;
pub use infra::local_fs::LocalFsStore;
pub use infra::memory_session::MemorySessionStore;
pub use presentation::router::{feedback_router, feedback_router_generic};
