use serde::{Deserialize, Serialize};

/// Persons and organisations named in a document.
///
/// Both lists are always present; a payload missing either field
/// deserializes to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default)]
    pub persons: Vec<String>,
    #[serde(default)]
    pub organisations: Vec<String>,
}

impl ExtractionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty() && self.organisations.is_empty()
    }

    pub fn entity_count(&self) -> usize {
        self.persons.len() + self.organisations.len()
    }
}

/// The parsing strategy that produced a recovered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Direct,
    Cleaned,
    KeyFolded,
    Lowercased,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Cleaned => "cleaned",
            Strategy::KeyFolded => "key_folded",
            Strategy::Lowercased => "lowercased",
        }
    }
}

/// A recovered result along with the strategy that won, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recovery {
    #[serde(flatten)]
    pub result: ExtractionResult,
    pub strategy: Option<Strategy>,
}

impl Recovery {
    pub fn exhausted() -> Self {
        Self {
            result: ExtractionResult::empty(),
            strategy: None,
        }
    }
}
