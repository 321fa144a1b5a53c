use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw approval item as returned by the Graph API
pub type RawApprovalItem = serde_json::Value;

/// One row of the raw approvals table, keyed by column name.
///
/// Missing columns read as the empty string so every consumer sees
/// "value or empty" regardless of how the row was produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawApprovalRecord {
    fields: HashMap<String, String>,
}

impl RawApprovalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `key`, or `""` when the column is absent
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    /// Value of `key` when present and non-empty
    pub fn get_opt(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder-style insert, handy for fixtures
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<HashMap<String, String>> for RawApprovalRecord {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawApprovalRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
