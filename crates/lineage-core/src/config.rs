//! Configuration for loading and output settings.
//!
//! Load order: `.lineage/config.toml` → environment variables → defaults.

use crate::graph::{ENTITY_CMODEL, Graph};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageConfig {
    pub load: LoadConfig,
    pub output: OutputConfig,
}

/// Loader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Content models removed from a node after every model record that touches it.
    pub pruned_content_models: Vec<String>,
}

/// Output configuration for the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Append content models to each pid in text output.
    pub show_content_models: bool,
}

/// How lineages are printed. Parsing is case-insensitive everywhere:
/// CLI flag, env var, and config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("unknown output format: {}. Use 'text' or 'json'.", other),
        }
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            pruned_content_models: vec![ENTITY_CMODEL.to_string()],
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl LineageConfig {
    /// Load config from `.lineage/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".lineage").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        env_override("LINEAGE_OUTPUT_FORMAT", &mut config.output.format);
        env_override(
            "LINEAGE_SHOW_CONTENT_MODELS",
            &mut config.output.show_content_models,
        );

        Ok(config)
    }

    /// An empty graph configured with this config's loader settings.
    pub fn new_graph(&self) -> Graph {
        Graph::with_pruned_content_models(self.load.pruned_content_models.clone())
    }
}
