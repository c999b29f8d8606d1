// TOML config adapter - Configuration loading from TOML files and the environment

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::errors::*;
use crate::utils::logging::LoggingConfig;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "concatx.toml";

/// External tool locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

/// Where progress sinks and manifests are created; the system temp dir when unset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// How often the progress sink is re-read while a job runs
    pub poll_interval_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tools: ToolsConfig,
    pub scratch: ScratchConfig,
    pub logging: LoggingConfig,
    pub progress: ProgressConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    config_file_path: Option<PathBuf>,
}

impl TomlConfigAdapter {
    /// Create an adapter reading `config_file_path`, or `concatx.toml` when it exists
    pub fn new(config_file_path: Option<PathBuf>) -> Self {
        Self { config_file_path }
    }

    /// Load the configuration, applying `CONCATX_*` environment overrides
    pub fn load(&self) -> Result<AppConfig, DomainError> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Load the configuration with environment lookups going through `env`
    pub fn load_with_env<F>(&self, env: F) -> Result<AppConfig, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.config_file() {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration file");
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    DomainError::ConfigFail(format!(
                        "Failed to read config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::parse(&content)?
            }
            None => AppConfig::default(),
        };

        apply_env_overrides(&mut config, env)?;
        validate(&config)?;
        Ok(config)
    }

    /// Parse TOML content into a configuration
    pub fn parse(toml_content: &str) -> Result<AppConfig, DomainError> {
        toml::from_str(toml_content)
            .map_err(|e| DomainError::ConfigFail(format!("Failed to parse TOML config: {}", e)))
    }

    /// Explicit path if one was given, otherwise the default file when present
    fn config_file(&self) -> Option<PathBuf> {
        match &self.config_file_path {
            Some(path) => Some(path.clone()),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                default.is_file().then(|| default.to_path_buf())
            }
        }
    }
}

fn apply_env_overrides<F>(config: &mut AppConfig, env: F) -> Result<(), DomainError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(ffmpeg) = env("CONCATX_FFMPEG") {
        config.tools.ffmpeg = PathBuf::from(ffmpeg);
    }
    if let Some(ffprobe) = env("CONCATX_FFPROBE") {
        config.tools.ffprobe = PathBuf::from(ffprobe);
    }
    if let Some(dir) = env("CONCATX_SCRATCH_DIR") {
        config.scratch.dir = Some(PathBuf::from(dir));
    }
    if let Some(level) = env("CONCATX_LOG_LEVEL") {
        config.logging.level = level
            .parse()
            .map_err(|e: DomainError| DomainError::ConfigFail(e.to_string()))?;
    }
    if let Some(format) = env("CONCATX_LOG_FORMAT") {
        config.logging.format = format
            .parse()
            .map_err(|e: DomainError| DomainError::ConfigFail(e.to_string()))?;
    }
    Ok(())
}

fn validate(config: &AppConfig) -> Result<(), DomainError> {
    if config.progress.poll_interval_ms == 0 {
        return Err(DomainError::ConfigFail(
            "progress.poll_interval_ms must be greater than zero".to_string(),
        ));
    }
    if config.tools.ffmpeg.as_os_str().is_empty() || config.tools.ffprobe.as_os_str().is_empty() {
        return Err(DomainError::ConfigFail(
            "tool paths must not be empty".to_string(),
        ));
    }
    Ok(())
}
