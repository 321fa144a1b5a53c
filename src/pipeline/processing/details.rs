use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::NOT_AVAILABLE;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-zA-Z0-9._%+-]+@[a-zA-Z0-9._-]+\.[a-zA-Z]{2,})").expect("valid regex")
});
static REQUESTING_AREA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:QUIEN SOLICITA|Solicitante):\s*([^\n*]*)").expect("valid regex")
});
static PROJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Proyecto\s*/\s*Aplicación:\s*([^\n*]*)").expect("valid regex")
});

/// Structured labels some approval descriptions carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailMetadata {
    pub requesting_area: String,
    pub project: String,
}

impl Default for DetailMetadata {
    fn default() -> Self {
        Self {
            requesting_area: NOT_AVAILABLE.to_string(),
            project: NOT_AVAILABLE.to_string(),
        }
    }
}

/// First email address found in the details text
pub fn extract_assignee(text: Option<&str>) -> Option<String> {
    let text = text.filter(|t| !t.is_empty())?;
    EMAIL
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Requesting area and project labels, `N/A` for any marker that is missing
pub fn extract_metadata(text: Option<&str>) -> DetailMetadata {
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ => return DetailMetadata::default(),
    };

    DetailMetadata {
        requesting_area: labelled_value(&REQUESTING_AREA, text),
        project: labelled_value(&PROJECT, text),
    }
}

fn labelled_value(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
