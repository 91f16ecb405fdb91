//! Configuration for the survival pipeline.
//!
//! Uses `figment` for layered configuration: defaults -> user config -> workspace
//! config -> explicit file -> environment. The loaded [`MlConfig`] is built once at
//! startup and handed to the registry and history collector by value.

use crate::error::MlError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MlConfig {
    /// Storage locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Train/evaluation split defaults.
    #[serde(default)]
    pub training: TrainingConfig,
    /// Dataset location.
    #[serde(default)]
    pub data: DataConfig,
}

/// Storage locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding `model_id_<N>.bin` / `model_id_<N>_info.json` pairs.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            artifact_dir: default_artifact_dir(),
        }
    }
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

/// Train/evaluation split settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation, in (0, 1).
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Seed for the split shuffle.
    #[serde(default = "default_random_state")]
    pub random_state: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: default_test_size(),
            random_state: default_random_state(),
        }
    }
}

fn default_test_size() -> f64 {
    0.2
}

fn default_random_state() -> u64 {
    42
}

impl TrainingConfig {
    /// Apply per-run overrides. Supplied fields win, the rest keep these defaults.
    pub fn merge(&self, overrides: &TrainingOverrides) -> Self {
        Self {
            test_size: overrides.test_size.unwrap_or(self.test_size),
            random_state: overrides.random_state.unwrap_or(self.random_state),
        }
    }

    pub fn validate(&self) -> Result<(), MlError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(MlError::Config(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        Ok(())
    }
}

/// Per-run training overrides, typically from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_state: Option<u64>,
}

/// Dataset location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV location: an `http(s)://` URL or a local path.
    #[serde(default = "default_data_url")]
    pub url: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            url: default_data_url(),
        }
    }
}

fn default_data_url() -> String {
    crate::data::TITANIC_URL.to_string()
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `SURVIVAL_`, `__` for nesting)
/// 2. Explicit config file (`--config`)
/// 3. Workspace-local config (`.survival/config.toml`)
/// 4. User config (`~/.config/survival/config.toml`)
/// 5. Built-in defaults
pub fn load_config(workspace: Option<&Path>, explicit: Option<&Path>) -> Result<MlConfig, MlError> {
    let mut figment = Figment::from(Serialized::defaults(MlConfig::default()));

    if let Some(dirs) = directories::ProjectDirs::from("dev", "survival", "survival") {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".survival").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(MlError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        figment = figment.merge(Toml::file(path));
    }

    // SURVIVAL_PATHS__ARTIFACT_DIR, SURVIVAL_TRAINING__TEST_SIZE, ...
    figment = figment.merge(Env::prefixed("SURVIVAL_").split("__"));

    let config: MlConfig = figment.extract()?;
    config.training.validate()?;
    Ok(config)
}
