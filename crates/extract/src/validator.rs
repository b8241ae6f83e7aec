use serde_json::Value;

use crate::schema::ExtractionResult;

/// Accepted literal keys per field, checked in order. Lookup is
/// case-sensitive; case folding happens while parsing.
const PERSON_KEYS: &[&str] = &["persons", "Persons"];
const ORGANISATION_KEYS: &[&str] = &["organisations", "Organisations", "organizations"];

/// Turn any parsed value into an `ExtractionResult`.
///
/// Non-object input, missing keys and non-list values all come out as empty
/// lists; non-string list elements are dropped.
pub fn validate(parsed: &Value) -> ExtractionResult {
    ExtractionResult {
        persons: string_list(resolve(parsed, PERSON_KEYS)),
        organisations: string_list(resolve(parsed, ORGANISATION_KEYS)),
    }
}

/// Whether `parsed` is an object carrying at least one accepted key.
pub fn has_recognized_key(parsed: &Value) -> bool {
    parsed.as_object().is_some_and(|map| {
        PERSON_KEYS
            .iter()
            .chain(ORGANISATION_KEYS)
            .any(|key| map.contains_key(*key))
    })
}

fn resolve<'a>(parsed: &'a Value, variants: &[&str]) -> Option<&'a Value> {
    let map = parsed.as_object()?;
    variants.iter().find_map(|key| map.get(*key))
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
