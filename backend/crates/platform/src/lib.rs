//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Environment configuration helpers
//! - Client identification from request headers
//! - Fixed-window rate limiting
//! - LLM gateway (text completion over HTTP)

pub mod client;
pub mod config;
pub mod llm;
pub mod rate_limit;
