//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (FeedbackRecord, SessionRecord, QualityAnalysis)
//! - Domain value objects (SessionKey, Category)
//! - Domain services (first-turn composition, analysis parsing, input checks)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
