//! Category values and their normalization
//!
//! Upstream sources hand over categories either as plain labels or as
//! structured `{id, name}` objects, sometimes with numeric ids. Downstream
//! grouping only ever sees the normalized key: `.name`, falling back to
//! `.id`, trimmed and lowercased.

use serde::{Deserialize, Serialize};

/// A category as supplied by the document source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryValue {
    /// A bare label such as `"architecture"`
    Label(String),
    /// A structured category; either field may be missing
    Structured {
        #[serde(default)]
        id: Option<serde_json::Value>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl CategoryValue {
    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }

    pub fn structured(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Structured {
            id: Some(serde_json::Value::String(id.into())),
            name: Some(name.into()),
        }
    }

    /// The grouping key for this category, or `None` if it carries no usable text.
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Label(label) => normalize_category_key(label),
            Self::Structured { id, name } => name
                .as_deref()
                .and_then(normalize_category_key)
                .or_else(|| id.as_ref().and_then(id_text).as_deref().and_then(normalize_category_key)),
        }
    }
}

impl From<&str> for CategoryValue {
    fn from(s: &str) -> Self {
        Self::Label(s.to_string())
    }
}

/// Trim and lowercase a category label. Empty labels have no key.
pub fn normalize_category_key(raw: &str) -> Option<String> {
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

fn id_text(id: &serde_json::Value) -> Option<String> {
    match id {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
