//! TOML configuration loading and validation.
//!
//! Every section is optional; command-line flags override what is set here.
//!
//! ```toml
//! [split]
//! n_splits = 5
//! group_column = "date"
//!
//! [output]
//! format = "json"
//! ```

use std::path::Path;

use groupfold::{ConfigurationError, GroupedOrdinalSplitter};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SplitConfig {
    /// Kept as a raw TOML value so that `n_splits = 2.5` is reported as a
    /// non-integral split count rather than a parse failure.
    pub n_splits: Option<toml::Value>,
    /// Column holding the group labels. Defaults to the first column.
    pub group_column: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// How split results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl SplitConfig {
    /// Build the splitter described by `n_splits`, or the default one.
    pub fn splitter(&self) -> std::result::Result<GroupedOrdinalSplitter, ConfigurationError> {
        match &self.n_splits {
            None => Ok(GroupedOrdinalSplitter::default()),
            Some(toml::Value::Integer(n)) => GroupedOrdinalSplitter::new(*n),
            Some(other) => Err(ConfigurationError::NonIntegral {
                value: other.to_string(),
            }),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse from a TOML string (useful for testing).
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    ///
    /// `n_splits` is checked when the splitter is built, after command-line
    /// overrides have been applied.
    fn validate(&self) -> Result<()> {
        if matches!(&self.split.group_column, Some(column) if column.trim().is_empty()) {
            return Err(Error::Config("group_column must not be empty".into()));
        }
        Ok(())
    }
}
