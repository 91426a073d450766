//! Read-side interpretation of stored `result_data`.
//!
//! The analyzer has produced two shapes over time: plain text, and a JSON
//! object with one text field per section. Storage keeps the raw string
//! untouched; UI-facing code calls [`ResultData::interpret`] when it needs to
//! render sections.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Stored analyzer output, resolved into one of its known shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ResultData {
    /// Free text (usually markdown).
    Plain(String),
    /// Named sections keyed by section name.
    Combined(BTreeMap<String, String>),
}

impl ResultData {
    /// Resolve a raw `result_data` string.
    ///
    /// A JSON object becomes `Combined`; string values are kept as-is and any
    /// other value is kept as its JSON text. Anything else, including JSON
    /// arrays and empty objects, is `Plain`.
    #[must_use]
    pub fn interpret(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        if !trimmed.starts_with('{') {
            return Self::Plain(raw.to_string());
        }
        match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(trimmed) {
            Ok(map) if !map.is_empty() => Self::Combined(
                map.into_iter()
                    .map(|(key, value)| {
                        let text = match value {
                            serde_json::Value::String(s) => s,
                            other => other.to_string(),
                        };
                        (key, text)
                    })
                    .collect(),
            ),
            _ => Self::Plain(raw.to_string()),
        }
    }

    /// Text of one section. `Plain` data only has the unnamed section.
    #[must_use]
    pub fn section(&self, key: &str) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::Combined(sections) => sections.get(key).map(String::as_str),
        }
    }

    /// Flatten into a single text, sections separated by blank lines.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Plain(text) => text.clone(),
            Self::Combined(sections) => sections
                .values()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}
