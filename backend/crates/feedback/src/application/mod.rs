//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Contains use case implementations.

pub mod analyze_quality;
pub mod config;
pub mod get_metadata;
pub mod prompts;
pub mod sanitize_feedback;
pub mod session_locks;
pub mod submit_feedback;
pub mod transform_feedback;
