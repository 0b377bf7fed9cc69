//! Builder configuration.
//!
//! Loaded from `page-builder.toml` in the site root. Every key is optional;
//! user values are merged over the stock defaults:
//!
//! ```toml
//! structures = "./structure"   # structure-description files
//! content = "content"          # markdown sources rendered into fragments
//! output = "build"             # where pages.json is written
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "page-builder.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Paths the builder reads from and writes to, relative to the site root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    /// Directory holding the structure-description files.
    pub structures: String,
    /// Directory holding markdown/HTML content fragments.
    pub content: String,
    /// Directory the resolved `pages.json` is written to.
    pub output: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            structures: "./structure".to_string(),
            content: "content".to_string(),
            output: "build".to_string(),
        }
    }
}

impl BuilderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.structures.trim().is_empty() {
            return Err(ConfigError::Validation(
                "structures must not be empty".into(),
            ));
        }
        if self.content.trim().is_empty() {
            return Err(ConfigError::Validation("content must not be empty".into()));
        }
        Ok(())
    }
}

/// Stock defaults as a TOML table, the base layer for user overrides.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(BuilderConfig::default())?)
}

/// Layer `overlay` over `base`. Tables merge per key, anything else replaces.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut merged), toml::Value::Table(layer)) => {
            for (key, value) in layer {
                let value = match merged.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            toml::Value::Table(merged)
        }
        (_, replacement) => replacement,
    }
}

/// Load the config for a site root, falling back to defaults.
///
/// A missing `page-builder.toml` is not an error; the stock defaults apply.
pub fn load_config(root: &Path) -> Result<BuilderConfig, ConfigError> {
    let mut merged = stock_defaults_value()?;
    let config_path = root.join(CONFIG_FILE);
    if config_path.exists() {
        let user: toml::Value = toml::from_str(&fs::read_to_string(&config_path)?)?;
        merged = merge_toml(merged, user);
    }
    let config: BuilderConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Documented stock `page-builder.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# page-builder configuration
# All settings are optional; the values below are the defaults.
# Paths are relative to the site root (the --root argument).

# Directory with structure-description files. Every *.json file in it
# describes a page tree; other files are ignored.
structures = "./structure"

# Directory with content fragments. Markdown files are rendered to HTML and
# can be referenced from structure files by path, e.g. "docs/intro.md".
content = "content"

# Directory the resolved pages.json is written to.
output = "build"
"##
}
