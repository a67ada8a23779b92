//! Domain Services
//!
//! Pure functions over feedback text: input checks, first-turn composition
//! and parsing of the quality analysis returned by the model.

use crate::domain::entities::{ElementAssessment, Personalization, QualityAnalysis, QualityElements};
use serde::Deserialize;

/// Reason a text input was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRejection {
    Blank,
    TooLong { max_chars: usize },
}

/// Accept `text` when it has at least one non-whitespace character and at
/// most `max_chars` characters
pub fn check_text(text: &str, max_chars: usize) -> Result<(), TextRejection> {
    if text.trim().is_empty() {
        return Err(TextRejection::Blank);
    }
    if text.chars().count() > max_chars {
        return Err(TextRejection::TooLong { max_chars });
    }
    Ok(())
}

/// Build the first user turn of a conversation
///
/// Deterministic in its inputs: a resumed conversation and a fresh one see
/// byte-identical first turns.
pub fn compose_first_turn(
    sanitized: &str,
    personalization: &Personalization,
    format_request: &str,
) -> String {
    let mut turn = String::from(
        "Here is feedback that someone wants to share with me. Please help me receive it.\n\n",
    );

    let mut context = Vec::new();
    if let Some(sender) = &personalization.sender_name {
        context.push(format!("It was written by {sender}."));
    }
    if let Some(recipient) = &personalization.recipient_name {
        context.push(format!("My name is {recipient}."));
    }
    if let Some(relationship) = &personalization.relationship {
        context.push(format!("Our working relationship: {relationship}."));
    }
    if !context.is_empty() {
        turn.push_str(&context.join("\n"));
        turn.push_str("\n\n");
    }

    turn.push_str("Feedback themes:\n");
    turn.push_str(sanitized);
    turn.push_str("\n\n---\n\nMy request: ");
    turn.push_str(format_request);
    turn
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    overall_score: f64,
    #[serde(default)]
    elements: QualityElements,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Strip a Markdown code fence (```json ... ```) around a model reply
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a model reply into a [`QualityAnalysis`]
///
/// Returns `None` when the reply is not the expected JSON object. The score
/// is clamped to 1..=10.
pub fn parse_quality_analysis(reply: &str) -> Option<QualityAnalysis> {
    let raw: RawAnalysis = serde_json::from_str(strip_fence(reply)).ok()?;
    if !raw.overall_score.is_finite() {
        return None;
    }
    let overall_score = raw.overall_score.round().clamp(1.0, 10.0) as u8;
    let suggestions = raw
        .suggestions
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    Some(QualityAnalysis {
        overall_score,
        elements: raw.elements,
        suggestions,
    })
}

/// Whether any of the three core elements was detected
pub fn has_core_elements(elements: &QualityElements) -> bool {
    [&elements.situation, &elements.behavior, &elements.impact]
        .into_iter()
        .any(|ElementAssessment { present, .. }| *present)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_text() {
        assert_eq!(check_text("   \n", 10), Err(TextRejection::Blank));
        assert_eq!(check_text("", 10), Err(TextRejection::Blank));
        assert!(check_text("ok", 2).is_ok());
        assert_eq!(
            check_text("abc", 2),
            Err(TextRejection::TooLong { max_chars: 2 })
        );
    }

    #[test]
    fn test_check_text_counts_chars_not_bytes() {
        assert!(check_text("ééé", 3).is_ok());
    }

    #[test]
    fn test_strip_fence() {
        assert_eq!(strip_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fence("```\n{}\n```\n"), "{}");
        assert_eq!(strip_fence("  {}  "), "{}");
    }

    #[test]
    fn test_parse_quality_analysis_clamps_score() {
        let parsed = parse_quality_analysis(r#"{"overallScore": 14, "suggestions": [" a ", ""]}"#)
            .unwrap();
        assert_eq!(parsed.overall_score, 10);
        assert_eq!(parsed.suggestions, vec!["a".to_string()]);
        assert!(!has_core_elements(&parsed.elements));
    }

    #[test]
    fn test_parse_quality_analysis_rejects_prose() {
        assert!(parse_quality_analysis("Looks good to me!").is_none());
    }
}
