//! Configuration file resolution and command-line overrides.

use crate::cli::Cli;
use crate::error::{CliError, Result};
use policylens_engine::PolicyLensConfig;
use policylens_trust::ScoringScheme;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file: `~/.policylens/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".policylens").join("config.toml"))
}

/// The file an explicit `--config` names, else the default location.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}

/// Load the configuration.
///
/// An explicit path must exist. The default location is optional and
/// falls back to built-in defaults when absent.
pub fn load_config(explicit: Option<&Path>) -> Result<PolicyLensConfig> {
    let path = resolve_config_path(explicit)?;
    if explicit.is_none() && !path.exists() {
        debug!("No configuration at {}, using defaults", path.display());
        return Ok(PolicyLensConfig::default());
    }
    Ok(PolicyLensConfig::load(&path)?)
}

/// Settings given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Ollama server URL
    pub ollama_url: Option<String>,
    /// Generation model
    pub model: Option<String>,
    /// Embedding model
    pub embedding_model: Option<String>,
    /// Scoring scheme
    pub scheme: Option<ScoringScheme>,
}

impl Overrides {
    /// Collect the global overrides from parsed arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            ollama_url: cli.ollama_url.clone(),
            model: cli.model.clone(),
            embedding_model: cli.embedding_model.clone(),
            scheme: None,
        }
    }

    /// Use `scheme` when given.
    pub fn with_scheme(mut self, scheme: Option<ScoringScheme>) -> Self {
        self.scheme = scheme;
        self
    }

    /// Apply the overrides and re-validate.
    pub fn apply(&self, config: &mut PolicyLensConfig) -> Result<()> {
        if let Some(url) = &self.ollama_url {
            config.llm.endpoint = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(model) = &self.embedding_model {
            config.llm.embedding_model = model.clone();
        }
        if let Some(scheme) = self.scheme {
            config.trust.scheme = scheme;
        }
        config.validate().map_err(CliError::Config)
    }
}
