//! Configuration for opening a data directory.
//!
//! Loaded with figment from, in order of precedence (highest first):
//! 1. Environment variables prefixed with `DOCFILE_` (e.g. `DOCFILE_DATA_DIR`)
//! 2. An optional TOML file
//! 3. Default values

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::durability::DurabilityMode;
use crate::error::{DocFileError, Result};

/// Prefix of environment variables read by [`DatabaseConfig::load_from`].
pub const ENV_PREFIX: &str = "DOCFILE_";

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Collections registered when the configuration does not name any.
pub const DEFAULT_COLLECTIONS: &[&str] = &[
    "user",
    "content",
    "testimonials",
    "features",
    "faqs",
    "api_keys",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Directory holding one `<collection>.json` file per collection.
    pub data_dir: PathBuf,
    /// Names accepted by `DatabaseCore::collection`. Anything else is an
    /// unknown collection.
    pub collections: Vec<String>,
    /// Whether rewrites are fsynced before being renamed into place.
    pub durability: DurabilityMode,
    /// Create an empty file for every registered collection on open.
    pub create_missing_files: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            collections: DEFAULT_COLLECTIONS.iter().map(|s| s.to_string()).collect(),
            durability: DurabilityMode::default(),
            create_missing_files: true,
        }
    }
}

impl DatabaseConfig {
    /// Load from defaults and environment only.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from defaults, an optional TOML file, and the environment.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let config: DatabaseConfig = Self::figment(config_path).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(DatabaseConfig::default()));
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_collections<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.collections = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_durability(mut self, durability: DurabilityMode) -> Self {
        self.durability = durability;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(DocFileError::ConfigValidation {
                message: "data_dir must not be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for name in &self.collections {
            validate_collection_name(name)?;
            if !seen.insert(name.as_str()) {
                return Err(DocFileError::ConfigValidation {
                    message: format!("collection '{}' is listed twice", name),
                });
            }
        }

        Ok(())
    }
}

/// Collection names become file names, so only `[A-Za-z0-9_-]` is allowed.
pub fn validate_collection_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(DocFileError::ConfigValidation {
            message: format!("invalid collection name: '{}'", name),
        })
    }
}
