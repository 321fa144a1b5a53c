use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::constants;
use crate::error::{PipelineError, Result};
use crate::pipeline::processing::{ClassificationOptions, OutputLayout};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub graph: GraphConfig,
    pub sharepoint: SharePointConfig,
    pub output: OutputConfig,
    pub classification: ClassificationOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub base_url: String,
    pub approvals_url: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: constants::GRAPH_BASE_URL.to_string(),
            approvals_url: constants::APPROVALS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SharePointConfig {
    pub site_id: String,
    pub drive_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
    pub raw_filename: String,
    pub clean_filename: String,
    /// Also publish the raw flattened table next to the clean one
    pub publish_raw: bool,
    pub layout: OutputLayout,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: constants::OUTPUT_DIR.to_string(),
            raw_filename: constants::OUTPUT_FILENAME.to_string(),
            clean_filename: constants::CLEAN_OUTPUT_FILENAME.to_string(),
            publish_raw: false,
            layout: OutputLayout::default(),
        }
    }
}

fn parse_env<T: FromStr<Err = String>>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|e| PipelineError::Config(format!("{}: {}", key, e)))
}

impl Config {
    /// Load `path`, or `config.toml` when present, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override file values with whatever `lookup` returns for the known keys
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("GRAPH_BASE_URL") {
            self.graph.base_url = v;
        }
        if let Some(v) = get("APPROVALS_URL") {
            self.graph.approvals_url = v;
        }
        if let Some(v) = get("SITE_ID") {
            self.sharepoint.site_id = v;
        }
        if let Some(v) = get("DRIVE_ID") {
            self.sharepoint.drive_id = v;
        }
        if let Some(v) = get("OUTPUT_DIR") {
            self.output.dir = v;
        }
        if let Some(v) = get("OUTPUT_FILENAME") {
            self.output.raw_filename = v;
        }
        if let Some(v) = get("CLEAN_OUTPUT_FILENAME") {
            self.output.clean_filename = v;
        }
        if let Some(v) = get("OUTPUT_LAYOUT") {
            self.output.layout = parse_env("OUTPUT_LAYOUT", &v)?;
        }
        if let Some(v) = get("TICKET_ID_POLICY") {
            self.classification.ticket_id = parse_env("TICKET_ID_POLICY", &v)?;
        }
        if let Some(v) = get("AREA_SOURCE") {
            self.classification.area_source = parse_env("AREA_SOURCE", &v)?;
        }
        if let Some(v) = get("AUTOMATION_RULE") {
            self.classification.automation = parse_env("AUTOMATION_RULE", &v)?;
        }
        Ok(())
    }
}
