//! Configuration handling for erd_peewee

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Default indentation width when tabs are not used
pub const DEFAULT_INDENT_SPACES: usize = 4;

/// Default name of the generated module file
pub const DEFAULT_OUTPUT_FILE: &str = "model.py";

/// Load configuration from a TOML file
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|e| {
        Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    from_toml_str(&config_str)
}

/// Parse configuration from TOML text
pub fn from_toml_str(config_str: &str) -> Result<Config> {
    toml::from_str(config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))
}

/// Represents the complete erd_peewee configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,
    pub logging: Option<LoggingConfig>,
}

impl Config {
    /// Check required options before any output is produced
    pub fn validate(&self) -> Result<()> {
        self.generator.validate()
    }
}

/// Code generation options
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneratorConfig {
    /// Indent with tab characters instead of spaces
    #[serde(default)]
    pub use_tab: bool,
    /// Indentation width when `use_tab` is off
    #[serde(default = "default_indent_spaces")]
    pub indent_spaces: usize,
    /// File name handed to `SqliteDatabase(...)`
    pub db_filename: Option<String>,
    /// Identifier of the database handle in the generated module
    pub db_variable: Option<String>,
    /// Emit entity documentation as docstrings
    #[serde(default = "default_doc_string")]
    pub doc_string: bool,
    /// Name of the generated module inside the output directory
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            use_tab: false,
            indent_spaces: DEFAULT_INDENT_SPACES,
            db_filename: None,
            db_variable: None,
            doc_string: default_doc_string(),
            output_file: default_output_file(),
        }
    }
}

impl GeneratorConfig {
    /// Validate the generator options
    pub fn validate(&self) -> Result<()> {
        require("db_filename", self.db_filename.as_deref())?;
        require("db_variable", self.db_variable.as_deref())?;

        if !self.use_tab && self.indent_spaces == 0 {
            return Err(Error::ConfigError(
                "indent_spaces must be greater than zero when use_tab is disabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Indentation unit used by the code writer
    pub fn indent_string(&self) -> String {
        if self.use_tab {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_spaces)
        }
    }

    /// Database file name, validated to be present
    pub fn db_filename(&self) -> Result<&str> {
        require("db_filename", self.db_filename.as_deref())
    }

    /// Database handle identifier, validated to be present
    pub fn db_variable(&self) -> Result<&str> {
        require("db_variable", self.db_variable.as_deref())
    }
}

fn require<'a>(option: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::ConfigError(format!(
            "Missing required option `generator.{}`",
            option
        ))),
    }
}

fn default_indent_spaces() -> usize {
    DEFAULT_INDENT_SPACES
}

fn default_doc_string() -> bool {
    true
}

fn default_output_file() -> String {
    DEFAULT_OUTPUT_FILE.to_string()
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub stdout: bool,
}

fn default_log_format() -> String {
    "text".to_string()
}
