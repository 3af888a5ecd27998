//! Response parsing into typed decisions and dialogue lines.
//!
//! The reasoning service returns free text that usually, but not always,
//! contains a JSON object. Decision parsing scans from the first `{` to the
//! last `}` and decodes whatever lies between, so explanatory prose before
//! or after the payload is tolerated. Two brace groups in one reply will
//! confuse it (an embedded example followed by the real answer decodes as
//! one invalid blob and falls back).
//!
//! Parsing never panics and never returns an error to the caller: a reply
//! that cannot be used is `None`, and the caller substitutes its fallback.

use hearth_types::{ActionKind, BehaviorDecision};
use serde_json::{Map, Value};

use crate::error::MindError;

/// Parse a behavior decision out of a raw LLM reply.
///
/// `action` must be present and name an [`ActionKind`] (any casing). A tag
/// outside that set is not passed through: the reply is rejected and the
/// caller falls back, so a decision always carries an action its executor
/// understands. `priority` and `duration` default to 0 when absent or
/// non-numeric, including numbers sent as strings; fractions round to the
/// nearest integer and negative durations clamp to 0. `target` and
/// `reasoning` default to empty strings.
pub fn parse_decision(raw: &str) -> Option<BehaviorDecision> {
    try_parse_decision(raw).ok()
}

/// Same as [`parse_decision`] but reports why parsing failed.
pub fn try_parse_decision(raw: &str) -> Result<BehaviorDecision, MindError> {
    let slice = extract_braced(raw)
        .ok_or_else(|| MindError::Parse("no brace-delimited object in response".to_owned()))?;

    let value: Value = serde_json::from_str(slice)?;
    let Value::Object(fields) = value else {
        return Err(MindError::Parse("payload is not a JSON object".to_owned()));
    };

    let action_tag = fields
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| MindError::Parse("missing 'action' field".to_owned()))?;
    let action = ActionKind::from_tag(action_tag)
        .ok_or_else(|| MindError::Parse(format!("unknown action: {action_tag}")))?;

    Ok(BehaviorDecision {
        action,
        target: string_field(&fields, "target"),
        priority: priority_field(&fields),
        duration: duration_field(&fields),
        reasoning: string_field(&fields, "reasoning"),
    })
}

/// Clean up a dialogue reply.
///
/// The reply is passed through as text: whitespace is trimmed and a single
/// pair of wrapping quotes is removed. An empty result is `None`.
pub fn parse_reply(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let unquoted = strip_wrapping_quotes(trimmed).trim();
    if unquoted.is_empty() {
        None
    } else {
        Some(unquoted.to_owned())
    }
}

/// Slice from the first `{` to the last `}`, inclusive.
fn extract_braced(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    text.get(start..=end)
}

/// Remove one pair of matching `"` or `'` around the whole string.
fn strip_wrapping_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// String field, or empty when absent or not a string.
fn string_field(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Numeric field as `f64`, accepting integers and floats. Numeric strings
/// are not accepted.
fn number_field(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    fields.get(key).and_then(Value::as_f64).filter(|n| n.is_finite())
}

/// `priority`, rounded and saturated into `i32`; 0 when unusable.
///
/// Float-to-int `as` saturates at the target bounds.
#[allow(clippy::cast_possible_truncation)]
fn priority_field(fields: &Map<String, Value>) -> i32 {
    number_field(fields, "priority").map_or(0, |n| n.round() as i32)
}

/// `duration` in whole seconds, rounded, negatives clamped to 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn duration_field(fields: &Map<String, Value>) -> u32 {
    number_field(fields, "duration").map_or(0, |n| n.round().max(0.0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_payload_wrapped_in_prose() {
        let raw = "Sure! {\"action\":\"EAT\",\"priority\":5} Hope that helps.";
        let d = parse_decision(raw);
        assert_eq!(
            d,
            Some(BehaviorDecision {
                action: ActionKind::Eat,
                target: String::new(),
                priority: 5,
                duration: 0,
                reasoning: String::new(),
            })
        );
    }

    #[test]
    fn parses_complete_payload() {
        let raw = r#"{"action": "SLEEP", "target": "home", "priority": 7, "duration": 12, "reasoning": "late"}"#;
        let d = parse_decision(raw);
        assert_eq!(
            d,
            Some(BehaviorDecision::new(ActionKind::Sleep, "home", 7, 12, "late"))
        );
    }

    #[test]
    fn no_braces_is_none() {
        assert_eq!(parse_decision("I think I'll go for a walk."), None);
        assert_eq!(parse_decision(""), None);
    }

    #[test]
    fn inverted_braces_is_none() {
        assert_eq!(parse_decision("} nothing here {"), None);
    }

    #[test]
    fn invalid_json_is_none() {
        assert_eq!(parse_decision("{action: EAT}"), None);
    }

    #[test]
    fn missing_action_is_none() {
        assert_eq!(parse_decision(r#"{"target": "home", "priority": 3}"#), None);
    }

    #[test]
    fn unknown_action_is_none() {
        let result = try_parse_decision(r#"{"action": "DANCE"}"#);
        assert!(matches!(result, Err(MindError::Parse(_))));
    }

    #[test]
    fn action_casing_is_ignored() {
        let d = parse_decision(r#"{"action": "flee"}"#);
        assert_eq!(d.map(|d| d.action), Some(ActionKind::Flee));
    }

    #[test]
    fn non_numeric_fields_default_to_zero() {
        let d = parse_decision(
            r#"{"action": "MOVE", "target": 12, "priority": "high", "duration": null}"#,
        );
        let d = d.unwrap_or_else(|| BehaviorDecision::new(ActionKind::Idle, "x", 99, 99, "x"));
        assert_eq!(d.action, ActionKind::Move);
        assert_eq!(d.target, "");
        assert_eq!(d.priority, 0);
        assert_eq!(d.duration, 0);
    }

    #[test]
    fn fractional_and_negative_numbers_are_normalized() {
        let d = parse_decision(r#"{"action": "WORK", "priority": 6.6, "duration": -3}"#);
        assert_eq!(d.as_ref().map(|d| d.priority), Some(7));
        assert_eq!(d.as_ref().map(|d| d.duration), Some(0));
    }

    #[test]
    fn markdown_fenced_payload_is_found() {
        let raw = "Here you go:\n```json\n{\"action\": \"INTERACT\", \"target\": \"player\"}\n```";
        let d = parse_decision(raw);
        assert_eq!(d.map(|d| d.target), Some("player".to_owned()));
    }

    #[test]
    fn nested_objects_are_tolerated() {
        let raw = r#"{"action": "MOVE", "target": "well", "meta": {"why": "thirsty"}}"#;
        assert_eq!(parse_decision(raw).map(|d| d.action), Some(ActionKind::Move));
    }

    #[test]
    fn two_brace_groups_fail_as_one_blob() {
        let raw = r#"Example: {"action": "IDLE"} Real answer: {"action": "EAT"}"#;
        assert_eq!(parse_decision(raw), None);
    }

    #[test]
    fn reply_is_trimmed_and_unquoted() {
        assert_eq!(
            parse_reply("  \"Welcome to my forge!\"\n"),
            Some("Welcome to my forge!".to_owned())
        );
        assert_eq!(parse_reply("'Aye.'"), Some("Aye.".to_owned()));
        assert_eq!(parse_reply("Plain words"), Some("Plain words".to_owned()));
    }

    #[test]
    fn empty_reply_is_none() {
        assert_eq!(parse_reply(""), None);
        assert_eq!(parse_reply("   \n"), None);
        assert_eq!(parse_reply("\"\""), None);
    }
}
