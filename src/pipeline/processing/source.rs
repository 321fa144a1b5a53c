use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const FALLBACK_AREA: &str = "Otro";

/// Configured owner keywords, lower-cased, checked in order
pub static SOURCE_AREAS: &[(&str, &str)] = &[
    ("control de cambios infraestructura", "Infraestructura"),
    ("infraestructura", "Infraestructura"),
    ("producción", "Producción"),
    ("registro", "Registro"),
    ("usfq path", "USFQ Path"),
];

const AUTOMATION_NEEDLE: &str = "Automatización";
const AUTOMATION_AREA: &str = "Automatización";

/// Treatment of the "Automatización" keyword.
///
/// The keyword has historically been compared, mixed-case, against the
/// lower-cased owner text, so it never matched. `Preserved` keeps that
/// behaviour until the taxonomy owners decide otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationRule {
    #[default]
    Preserved,
    CaseFolded,
}

impl FromStr for AutomationRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "preserved" => Ok(AutomationRule::Preserved),
            "case_folded" => Ok(AutomationRule::CaseFolded),
            other => Err(format!(
                "unknown automation rule '{}' (expected preserved or case_folded)",
                other
            )),
        }
    }
}

impl fmt::Display for AutomationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomationRule::Preserved => write!(f, "preserved"),
            AutomationRule::CaseFolded => write!(f, "case_folded"),
        }
    }
}

/// Maps the owner/source text of an approval to a coarse area
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceClassifier {
    pub automation: AutomationRule,
}

impl SourceClassifier {
    pub fn new(automation: AutomationRule) -> Self {
        Self { automation }
    }

    pub fn classify(&self, text: Option<&str>) -> String {
        let text = match text {
            Some(t) if !t.is_empty() => t,
            _ => return String::new(),
        };
        let lower = text.to_lowercase();

        if let Some((_, area)) = SOURCE_AREAS.iter().find(|(key, _)| lower.contains(key)) {
            return area.to_string();
        }

        if lower.contains("producción") {
            return "Producción".to_string();
        }
        if lower.contains("infraestructura") || lower.contains("cdc") {
            return "Infraestructura".to_string();
        }
        if lower.contains("registro") {
            return "Registro".to_string();
        }

        let needle = match self.automation {
            AutomationRule::Preserved => AUTOMATION_NEEDLE.to_string(),
            AutomationRule::CaseFolded => AUTOMATION_NEEDLE.to_lowercase(),
        };
        if lower.contains(&needle) {
            return AUTOMATION_AREA.to_string();
        }

        FALLBACK_AREA.to_string()
    }
}

/// Classify with the automation keyword left as it has always behaved
pub fn classify_source(text: Option<&str>) -> String {
    SourceClassifier::default().classify(text)
}
