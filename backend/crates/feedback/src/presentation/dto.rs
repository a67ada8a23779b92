//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request for POST /api/feedback/sanitize and /api/feedback/analyze-quality
#[derive(Debug, Clone, Deserialize)]
pub struct DraftRequest {
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Response for POST /api/feedback/sanitize
#[derive(Debug, Clone, Serialize)]
pub struct SanitizeResponse {
    pub sanitized: String,
}

/// Request for POST /api/feedback
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    pub raw_feedback: Option<String>,
    #[serde(default)]
    pub sanitized_feedback: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
}

/// Response for POST /api/feedback
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub id: String,
}

/// Response for GET /api/feedback/{id}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResponse {
    pub exists: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

/// Request for POST /api/feedback/{id}/transform
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Response for POST /api/feedback/{id}/transform
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    pub response: String,
    pub conversation_id: String,
}
