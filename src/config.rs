//! Defaults file for the `promptwheel` binary.
//!
//! An optional `promptwheel.toml` supplies fallback values for the run
//! flags; explicit CLI flags always win. Values can also be overridden
//! through `PROMPTWHEEL__`-prefixed environment variables.

use std::path::Path;

use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::engine::{LoopMode, NamingMode, SeedMode, TraversalMode};

/// Default name of the defaults file, looked up in the working directory.
pub const DEFAULTS_FILE_NAME: &str = "promptwheel.toml";

/// Errors that can occur when loading the defaults file.
#[derive(Debug, Error)]
pub enum DefaultsError {
    /// The configuration file was not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] ConfigError),

    /// The configuration file path is invalid.
    #[error("invalid configuration path: {0}")]
    InvalidPath(String),
}

/// Fallback values for the run flags.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineDefaults {
    /// Traversal mode
    #[serde(default)]
    pub mode: TraversalMode,
    /// Loop mode for sequential traversal
    #[serde(default)]
    pub loop_mode: LoopMode,
    /// Filename derivation mode
    #[serde(default)]
    pub filename_mode: NamingMode,
    /// Base filename stem
    #[serde(default = "default_base_filename")]
    pub base_filename: String,
    /// Seed policy
    #[serde(default)]
    pub seed_mode: SeedMode,
    /// Workflow id
    #[serde(default = "default_workflow_id")]
    pub workflow_id: String,
    /// Number of steps one invocation runs
    #[serde(default = "default_steps")]
    pub steps: u32,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            mode: TraversalMode::default(),
            loop_mode: LoopMode::default(),
            filename_mode: NamingMode::default(),
            base_filename: default_base_filename(),
            seed_mode: SeedMode::default(),
            workflow_id: default_workflow_id(),
            steps: default_steps(),
        }
    }
}

fn default_base_filename() -> String {
    "output".to_string()
}

fn default_workflow_id() -> String {
    crate::engine::DEFAULT_WORKFLOW_ID.to_string()
}

fn default_steps() -> u32 {
    1
}

impl EngineDefaults {
    /// Load defaults from a TOML file.
    ///
    /// Environment variables with the `PROMPTWHEEL__` prefix override file
    /// values (e.g. `PROMPTWHEEL__SEED_MODE=fixed`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be parsed, or
    /// the path is not valid UTF-8.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DefaultsError> {
        let path = path.as_ref();

        let path_str = path
            .to_str()
            .ok_or_else(|| DefaultsError::InvalidPath(format!("{:?}", path)))?;

        if !path.exists() {
            return Err(DefaultsError::FileNotFound(path_str.to_string()));
        }

        let config = Config::builder()
            .add_source(File::with_name(path_str))
            .add_source(
                Environment::with_prefix("PROMPTWHEEL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Resolve defaults for the binary.
    ///
    /// An explicit path must load successfully. Without one, a
    /// `promptwheel.toml` in the working directory is used when present,
    /// and built-in defaults otherwise.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, DefaultsError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULTS_FILE_NAME);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
