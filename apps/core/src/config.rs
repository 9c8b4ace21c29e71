use std::fmt::{Display, Formatter};
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const APP_DIR_NAME: &str = "quickrun";
const CONFIG_FILENAME: &str = "config.toml";
const HISTORY_FILENAME: &str = "history";
const CANDIDATE_CACHE_FILENAME: &str = "candidates.bin";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Parse(error) => write!(f, "parse error: {error}"),
            Self::Invalid(error) => write!(f, "invalid config: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the colon-delimited search-path variable to scan.
    pub path_env: String,
    /// Cap applied to explicit match limits coming from the shell.
    pub max_results: u16,
    /// Disables both reading and writing the launch history.
    pub no_history: bool,
    /// Silences stdout/stderr of spawned commands.
    pub silent: bool,
    pub cache_dir: PathBuf,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path_env: "PATH".to_string(),
            max_results: 32,
            no_history: false,
            silent: false,
            cache_dir: stable_cache_dir(),
            config_path: default_config_path(),
        }
    }
}

impl Config {
    pub fn history_path(&self) -> PathBuf {
        self.cache_dir.join(HISTORY_FILENAME)
    }

    pub fn candidate_cache_path(&self) -> PathBuf {
        self.cache_dir.join(CANDIDATE_CACHE_FILENAME)
    }
}

pub fn stable_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(CONFIG_FILENAME)
}

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.path_env.trim().is_empty() {
        return Err(ConfigError::Invalid("path_env is required".into()));
    }

    if config.max_results == 0 || config.max_results > 500 {
        return Err(ConfigError::Invalid("max_results out of range".into()));
    }

    if config.cache_dir.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("cache_dir is required".into()));
    }

    Ok(())
}

/// Loads the TOML config file, falling back to defaults when it does not
/// exist yet. `path` overrides the per-user default location.
pub fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let config_path = path.unwrap_or_else(default_config_path);
    let mut config = match fs::read_to_string(&config_path) {
        Ok(raw) => {
            toml::from_str::<Config>(&raw).map_err(|error| ConfigError::Parse(error.to_string()))?
        }
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(error) => return Err(ConfigError::Io(error)),
    };
    config.config_path = config_path;
    validate(&config)?;
    Ok(config)
}

pub fn save(config: &Config) -> Result<(), ConfigError> {
    let encoded =
        toml::to_string_pretty(config).map_err(|error| ConfigError::Parse(error.to_string()))?;
    if let Some(parent) = config.config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config.config_path, encoded)?;
    Ok(())
}
