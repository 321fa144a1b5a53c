use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::NOT_AVAILABLE;

pub const DEFAULT_MACRO: &str = "Otros";
pub const DEFAULT_MICRO: &str = "General";

static FIRST_DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)").expect("valid regex"));
static MARKED_DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?::|N[º°])\s*([0-9]+)").expect("valid regex"));

/// Two-level category plus ticket reference derived from an approval title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "macro")]
    pub macro_category: String,
    #[serde(rename = "micro")]
    pub micro_category: String,
    pub ticket_id: String,
}

impl Default for ClassificationResult {
    fn default() -> Self {
        Self {
            macro_category: DEFAULT_MACRO.to_string(),
            micro_category: DEFAULT_MICRO.to_string(),
            ticket_id: NOT_AVAILABLE.to_string(),
        }
    }
}

impl ClassificationResult {
    /// `"{macro} | {micro} #{ticket}"`
    pub fn clean_title(&self) -> String {
        format!(
            "{} | {} #{}",
            self.macro_category, self.micro_category, self.ticket_id
        )
    }

    pub fn has_ticket_id(&self) -> bool {
        self.ticket_id != NOT_AVAILABLE
    }
}

/// How the ticket id is located inside a title
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketIdPolicy {
    /// First run of ASCII digits anywhere in the title
    #[default]
    FirstDigitRun,
    /// Only digits right after `:` or `N°`/`Nº`
    Marked,
}

impl TicketIdPolicy {
    pub fn extract(&self, title: &str) -> Option<String> {
        let re = match self {
            TicketIdPolicy::FirstDigitRun => &*FIRST_DIGIT_RUN,
            TicketIdPolicy::Marked => &*MARKED_DIGIT_RUN,
        };
        re.captures(title)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl FromStr for TicketIdPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "first_digit_run" | "first" => Ok(TicketIdPolicy::FirstDigitRun),
            "marked" => Ok(TicketIdPolicy::Marked),
            other => Err(format!(
                "unknown ticket id policy '{}' (expected first_digit_run or marked)",
                other
            )),
        }
    }
}

impl fmt::Display for TicketIdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketIdPolicy::FirstDigitRun => write!(f, "first_digit_run"),
            TicketIdPolicy::Marked => write!(f, "marked"),
        }
    }
}

/// One entry of the ordered title rule table.
///
/// A rule fires when any trigger is a substring of the upper-cased title.
/// The micro category is the label of the first matching refinement, or
/// `micro_fallback` when none match.
#[derive(Debug)]
pub struct TitleRule {
    pub name: &'static str,
    pub triggers: &'static [&'static str],
    pub macro_category: &'static str,
    pub refinements: &'static [(&'static str, &'static str)],
    pub micro_fallback: &'static str,
}

impl TitleRule {
    pub fn matches(&self, upper_title: &str) -> bool {
        self.triggers.iter().any(|t| upper_title.contains(t))
    }

    pub fn micro_for(&self, upper_title: &str) -> &'static str {
        self.refinements
            .iter()
            .find(|(needle, _)| upper_title.contains(needle))
            .map(|(_, label)| *label)
            .unwrap_or(self.micro_fallback)
    }
}

/// Evaluated top to bottom, first match wins.
pub static TITLE_RULES: &[TitleRule] = &[
    TitleRule {
        name: "change_control",
        triggers: &["CDC", "CONTROL DE CAMBIOS"],
        macro_category: "Control de Cambios (CDC)",
        refinements: &[
            ("BDD", "Base de Datos"),
            ("SEGURIDAD", "Seguridad"),
            ("INFRAESTRUCTURA", "Infraestructura"),
        ],
        micro_fallback: "General",
    },
    TitleRule {
        name: "production_release",
        triggers: &["PASO A PRODUCCIÓN"],
        macro_category: "Paso a Producción",
        refinements: &[("TERCEROS", "App Terceros")],
        micro_fallback: "Producción",
    },
    TitleRule {
        name: "publication",
        triggers: &["PUBLICACIÓN"],
        macro_category: "Publicación",
        refinements: &[("TERCEROS", "App Terceros")],
        micro_fallback: "Otros",
    },
    TitleRule {
        name: "functional_analysis",
        triggers: &["ANALISIS FUNCIONAL DEL SERVICIO"],
        macro_category: "Análisis Funcional",
        refinements: &[("APLICACIONES", "Aplicaciones")],
        micro_fallback: "Otros",
    },
    TitleRule {
        name: "requirements_gathering",
        triggers: &["SOLICITUD DE LEVANTAMIENTO"],
        macro_category: "Levantamiento",
        refinements: &[],
        micro_fallback: "General",
    },
    TitleRule {
        name: "identity_management",
        triggers: &["CUENTA"],
        macro_category: "Gestión de Identidades",
        refinements: &[
            ("GENÉRICA", "Cuenta Genérica"),
            ("SERVICIO", "Cuenta de Servicio"),
            ("PRIVILEGIADA", "Cuenta Privilegiada"),
        ],
        micro_fallback: DEFAULT_MICRO,
    },
    TitleRule {
        name: "connectivity",
        triggers: &["VPN"],
        macro_category: "Conectividad",
        refinements: &[],
        micro_fallback: "VPN",
    },
];

/// Maps approval titles to categories using [`TITLE_RULES`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleClassifier {
    pub ticket_id_policy: TicketIdPolicy,
}

impl TitleClassifier {
    pub fn new(ticket_id_policy: TicketIdPolicy) -> Self {
        Self { ticket_id_policy }
    }

    pub fn classify(&self, title: Option<&str>) -> ClassificationResult {
        let title = match title {
            Some(t) if !t.is_empty() => t,
            _ => return ClassificationResult::default(),
        };

        let upper = title.to_uppercase();
        let ticket_id = self
            .ticket_id_policy
            .extract(title)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        match matching_rule(&upper) {
            Some(rule) => ClassificationResult {
                macro_category: rule.macro_category.to_string(),
                micro_category: rule.micro_for(&upper).to_string(),
                ticket_id,
            },
            None => ClassificationResult {
                ticket_id,
                ..ClassificationResult::default()
            },
        }
    }
}

/// First rule in table order that fires for an upper-cased title
pub fn matching_rule(upper_title: &str) -> Option<&'static TitleRule> {
    TITLE_RULES.iter().find(|rule| rule.matches(upper_title))
}

/// Classify with the default ticket id policy
pub fn classify_title(title: Option<&str>) -> ClassificationResult {
    TitleClassifier::default().classify(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(title: &str) -> (String, String, String) {
        let r = classify_title(Some(title));
        (r.macro_category, r.micro_category, r.ticket_id)
    }

    #[test]
    fn empty_or_missing_title_uses_defaults() {
        assert_eq!(classify_title(None), ClassificationResult::default());
        assert_eq!(classify_title(Some("")), ClassificationResult::default());
        assert_eq!(
            classify_title(Some("")).clean_title(),
            "Otros | General #N/A"
        );
    }

    #[test]
    fn change_control_refinements_in_order() {
        assert_eq!(
            classify("cdc bdd :136"),
            ("Control de Cambios (CDC)".into(), "Base de Datos".into(), "136".into())
        );
        assert_eq!(
            classify("Control de cambios seguridad infraestructura").1,
            "Seguridad"
        );
        assert_eq!(classify("CDC Infraestructura").1, "Infraestructura");
        assert_eq!(classify("CDC red").1, "General");
    }

    #[test]
    fn release_and_publication_are_separate_rules() {
        assert_eq!(
            classify("Paso a producción app terceros"),
            ("Paso a Producción".into(), "App Terceros".into(), "N/A".into())
        );
        assert_eq!(classify("Paso a producción portal").1, "Producción");
        assert_eq!(classify("Publicación terceros").1, "App Terceros");
        assert_eq!(
            classify("Publicación noticia"),
            ("Publicación".into(), "Otros".into(), "N/A".into())
        );
    }

    #[test]
    fn analysis_and_gathering_rules() {
        assert_eq!(
            classify("Analisis funcional del servicio de aplicaciones"),
            ("Análisis Funcional".into(), "Aplicaciones".into(), "N/A".into())
        );
        assert_eq!(classify("ANALISIS FUNCIONAL DEL SERVICIO").1, "Otros");
        assert_eq!(
            classify("Solicitud de levantamiento 42"),
            ("Levantamiento".into(), "General".into(), "42".into())
        );
    }

    #[test]
    fn account_rule_wins_over_vpn() {
        assert_eq!(
            classify("Cuenta VPN proveedor"),
            ("Gestión de Identidades".into(), "General".into(), "N/A".into())
        );
        assert_eq!(classify("Cuenta genérica").1, "Cuenta Genérica");
        assert_eq!(classify("Cuenta de servicio").1, "Cuenta de Servicio");
        assert_eq!(classify("Cuenta privilegiada").1, "Cuenta Privilegiada");
        assert_eq!(
            classify("Acceso VPN"),
            ("Conectividad".into(), "VPN".into(), "N/A".into())
        );
    }

    #[test]
    fn unmatched_title_keeps_ticket_id() {
        assert_eq!(
            classify("Compra de licencias 2025"),
            ("Otros".into(), "General".into(), "2025".into())
        );
    }

    #[test]
    fn only_ascii_digits_form_ticket_ids() {
        assert_eq!(classify("CDC \u{661}\u{663}\u{666}").2, "N/A");
        assert_eq!(
            TicketIdPolicy::Marked.extract("VPN N° \u{661}\u{663}"),
            None
        );
        assert_eq!(classify("CDC \u{661}\u{663} 42").2, "42");
    }

    #[test]
    fn marked_policy_ignores_unmarked_digits() {
        let classifier = TitleClassifier::new(TicketIdPolicy::Marked);
        assert_eq!(classifier.classify(Some("CDC 2025 N° 287")).ticket_id, "287");
        assert_eq!(classifier.classify(Some("CDC 2025 Nº287")).ticket_id, "287");
        assert_eq!(classifier.classify(Some("CDC 2025 : 13")).ticket_id, "13");
        assert_eq!(classifier.classify(Some("CDC 2025")).ticket_id, "N/A");

        let default = TitleClassifier::default();
        assert_eq!(default.classify(Some("CDC 2025 N° 287")).ticket_id, "2025");
    }

    #[test]
    fn rule_table_order_is_stable() {
        let names: Vec<_> = TITLE_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "change_control",
                "production_release",
                "publication",
                "functional_analysis",
                "requirements_gathering",
                "identity_management",
                "connectivity",
            ]
        );
        assert!(matching_rule("NADA").is_none());
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!("marked".parse::<TicketIdPolicy>(), Ok(TicketIdPolicy::Marked));
        assert_eq!(
            "first-digit-run".parse::<TicketIdPolicy>(),
            Ok(TicketIdPolicy::FirstDigitRun)
        );
        assert!("loose".parse::<TicketIdPolicy>().is_err());
    }
}
