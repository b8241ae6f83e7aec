use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cleanup;
use crate::schema::{ExtractionResult, Recovery, Strategy};
use crate::validator::{has_recognized_key, validate};

type Attempt = fn(&str) -> Result<Value>;

/// Tried in order; the first attempt that yields an object with an entity
/// key wins, even if validation then empties its fields.
const STRATEGIES: &[(Strategy, Attempt)] = &[
    (Strategy::Direct, parse_direct),
    (Strategy::Cleaned, parse_cleaned),
    (Strategy::KeyFolded, parse_key_folded),
    (Strategy::Lowercased, parse_lowercased),
];

/// Recover persons and organisations from a raw model reply.
///
/// Never fails: when every strategy is exhausted the result is empty.
pub fn recover(raw_reply: &str) -> ExtractionResult {
    recover_with_trace(raw_reply).result
}

/// Like [`recover`], also reporting which strategy produced the result.
pub fn recover_with_trace(raw_reply: &str) -> Recovery {
    for (strategy, attempt) in STRATEGIES {
        match attempt(raw_reply) {
            Ok(parsed) if has_recognized_key(&parsed) => {
                debug!(strategy = strategy.as_str(), "Recovered entities from reply");
                return Recovery {
                    result: validate(&parsed),
                    strategy: Some(*strategy),
                };
            }
            Ok(_) => {
                debug!(
                    strategy = strategy.as_str(),
                    "Reply parsed without any entity keys, trying next strategy"
                );
            }
            Err(e) => {
                debug!(
                    strategy = strategy.as_str(),
                    error = %e,
                    "Failed to parse reply, trying next strategy"
                );
            }
        }
    }

    warn!(
        reply_len = raw_reply.len(),
        "All recovery strategies failed, returning empty result"
    );
    Recovery::exhausted()
}

fn parse_object(text: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(text).context("Invalid JSON")?;
    if !value.is_object() {
        anyhow::bail!("Expected a JSON object, found {}", kind(&value));
    }
    Ok(value)
}

fn parse_direct(raw: &str) -> Result<Value> {
    parse_object(raw)
}

fn parse_cleaned(raw: &str) -> Result<Value> {
    parse_object(&cleanup::clean(raw))
}

fn parse_key_folded(raw: &str) -> Result<Value> {
    parse_cleaned(raw).map(fold_keys)
}

fn parse_lowercased(raw: &str) -> Result<Value> {
    parse_object(&raw.to_lowercase())
}

/// Lowercase the top-level keys. A key that is already lowercase beats any
/// other spelling that folds onto it.
fn fold_keys(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };

    let mut folded = Map::new();
    for (key, value) in map {
        let lower = key.to_lowercase();
        if lower == key || !folded.contains_key(&lower) {
            folded.insert(lower, value);
        }
    }
    Value::Object(folded)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn happy() -> ExtractionResult {
        ExtractionResult {
            persons: vec!["John Doe".into(), "Alice".into(), "Bob".into()],
            organisations: vec!["Acme Corp".into(), "Giga Tech".into()],
        }
    }

    #[test]
    fn test_valid_formatting() {
        let reply = r#"{"persons": ["John Doe", "Alice", "Bob"], "organisations": ["Acme Corp", "Giga Tech"]}"#;
        let recovery = recover_with_trace(reply);
        assert_eq!(recovery.result, happy());
        assert_eq!(recovery.strategy, Some(Strategy::Direct));
    }

    #[test]
    fn test_unquoted_keys() {
        let reply = r#"{"persons": ["John Doe", "Alice", "Bob"], organisations: ["Acme Corp", "Giga Tech"]}"#;
        let recovery = recover_with_trace(reply);
        assert_eq!(recovery.result, happy());
        assert_eq!(recovery.strategy, Some(Strategy::Cleaned));
    }

    #[test]
    fn test_non_ascii_keys() {
        let reply = r#"{"perso‰¿ns¿": ["John Doe", "Alice", "Bob"], "¿org‰anisat¿ions": ["Acme Corp", "Giga Tech"]}"#;
        let recovery = recover_with_trace(reply);
        assert_eq!(recovery.result, happy());
        assert_eq!(recovery.strategy, Some(Strategy::Cleaned));
    }

    #[test]
    fn test_key_casing() {
        let reply = r#"{"PeRsOns": ["John Doe", "Alice", "Bob"], oRGANIsatioNS: ["Acme Corp", "Giga Tech"]}"#;
        let recovery = recover_with_trace(reply);
        assert_eq!(recovery.result, happy());
        assert_eq!(recovery.strategy, Some(Strategy::KeyFolded));
    }

    #[test]
    fn test_american_spelling() {
        let reply = r#"{"persons": ["John Doe", "Alice", "Bob"], "organizations": ["Acme Corp", "Giga Tech"]}"#;
        assert_eq!(recover(reply), happy());
    }

    #[test]
    fn test_lowercased_fallback_repairs_literals() {
        let reply = r#"{"persons": ["Alice"], "organisations": NULL}"#;
        let recovery = recover_with_trace(reply);
        assert_eq!(recovery.strategy, Some(Strategy::Lowercased));
        assert_eq!(recovery.result.persons, vec!["alice"]);
        assert!(recovery.result.organisations.is_empty());
    }

    #[test]
    fn test_object_inside_other_text_is_not_recovered() {
        for reply in [
            r#"[{"persons": ["John Doe"], "organisations": ["Acme Corp"]}]"#,
            r#"{"persons": ["Alice"], "organisations": []} trailing"#,
            "Here is the JSON:\n```json\n{\"persons\": [\"Alice\"], \"organisations\": []}\n```",
        ] {
            assert_eq!(recover_with_trace(reply), Recovery::exhausted(), "reply: {reply}");
        }
    }

    #[test]
    fn test_scalars_rejected() {
        let recovery = recover_with_trace(r#"{"persons": "Alice", "organisations": "Acme Corp"}"#);
        assert!(recovery.result.is_empty());
        // Recognized keys with bad values still win; no later strategy runs.
        assert_eq!(recovery.strategy, Some(Strategy::Direct));
    }

    #[test]
    fn test_mixed_type_elements() {
        let reply = r#"{"persons": ["John Doe", 1, "Alice", 2.5, "Bob"], "organisations": []}"#;
        assert_eq!(recover(reply).persons, vec!["John Doe", "Alice", "Bob"]);
    }

    #[test]
    fn test_structurally_invalid_json() {
        for reply in [
            r#"{"John Doe", "Alice", "Bob"}"#,
            r#"["John Doe", "Alice", "Bob"]"#,
        ] {
            let recovery = recover_with_trace(reply);
            assert_eq!(recovery, Recovery::exhausted(), "reply: {reply}");
        }
    }

    #[test]
    fn test_key_order_independence() {
        let forward = r#"{"persons": ["Alice"], "organisations": ["Acme Corp"]}"#;
        let reversed = r#"{"organisations": ["Acme Corp"], "persons": ["Alice"]}"#;
        assert_eq!(recover(forward), recover(reversed));
    }

    #[test]
    fn test_totality() {
        let deep = "[".repeat(10_000);
        let inputs = [
            "",
            "   ",
            "not json at all",
            "{",
            "}{",
            "null",
            "42",
            "\"persons\"",
            "{\"persons\": [",
            "‰¿‰¿",
            deep.as_str(),
        ];
        for input in inputs {
            assert!(recover(input).is_empty(), "input: {input:?}");
        }
    }

    #[test]
    fn test_fold_keys_prefers_lowercase_key() {
        let folded = fold_keys(serde_json::json!({"PERSONS": ["B"], "persons": ["A"]}));
        assert_eq!(folded["persons"], serde_json::json!(["A"]));
    }
}
