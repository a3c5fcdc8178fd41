/// Configuration loading and logging setup for the assistance engine
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_RULES_HELP_BASE: &str = "https://avwo.github.io/whistle/rules/";
pub const DEFAULT_PLUGINS_INDEX_URL: &str = "https://avwo.github.io/whistle/plugins.html";

/// Logging options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`
    pub level: String,
    /// Include targets, thread ids and source locations
    pub debug: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            debug: false,
        }
    }
}

/// Tunables for one assistance engine instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    pub enabled: bool,
    pub debounce_ms: u64,
    pub max_candidates: usize,
    pub max_hint_len: usize,
    pub max_var_len: usize,
    pub rules_help_base: String,
    pub plugins_index_url: String,
    pub at_help_url: Option<String>,
    /// Replaces the built-in protocol list when present
    pub protocols: Option<Vec<String>>,
    pub logging: LoggingConfig,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 120,
            max_candidates: 60,
            max_hint_len: 512,
            max_var_len: 100,
            rules_help_base: DEFAULT_RULES_HELP_BASE.to_string(),
            plugins_index_url: DEFAULT_PLUGINS_INDEX_URL.to_string(),
            at_help_url: None,
            protocols: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl AssistConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Default help page for `@` values
    pub fn at_help_url(&self) -> String {
        self.at_help_url
            .clone()
            .unwrap_or_else(|| format!("{}@.html", self.rules_help_base))
    }

    pub fn limits(&self) -> HintLimits {
        HintLimits {
            max_candidates: self.max_candidates,
            max_hint_len: self.max_hint_len,
            max_var_len: self.max_var_len,
        }
    }
}

/// Size bounds applied to words and candidate lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintLimits {
    pub max_candidates: usize,
    pub max_hint_len: usize,
    pub max_var_len: usize,
}

impl Default for HintLimits {
    fn default() -> Self {
        AssistConfig::default().limits()
    }
}

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Some(ConfigFormat::Yaml),
            Some("json") => Some(ConfigFormat::Json),
            _ => None,
        }
    }
}

/// Loader for [`AssistConfig`]
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_from_yaml(path: &Path) -> AssistResult<AssistConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_string(&content, ConfigFormat::Yaml)
    }

    pub fn load_from_json(path: &Path) -> AssistResult<AssistConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_string(&content, ConfigFormat::Json)
    }

    /// Load a file, picking the format from its extension
    pub fn load_from_path(path: &Path) -> AssistResult<AssistConfig> {
        match ConfigFormat::from_path(path) {
            Some(ConfigFormat::Yaml) => Self::load_from_yaml(path),
            Some(ConfigFormat::Json) => Self::load_from_json(path),
            None => Err(AssistError::ConfigError(format!(
                "Unsupported configuration file: {}",
                path.display()
            ))),
        }
    }

    pub fn load_from_string(content: &str, format: ConfigFormat) -> AssistResult<AssistConfig> {
        let config: AssistConfig = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Self::validate_config(&config)?;
        Ok(config)
    }

    fn validate_config(config: &AssistConfig) -> AssistResult<()> {
        if config.debounce_ms == 0 {
            return Err(AssistError::ConfigError(
                "debounce_ms must be greater than zero".to_string(),
            ));
        }

        if config.max_candidates == 0 {
            return Err(AssistError::ConfigError(
                "max_candidates must be greater than zero".to_string(),
            ));
        }

        if config.max_var_len > config.max_hint_len {
            return Err(AssistError::ConfigError(
                "max_var_len cannot exceed max_hint_len".to_string(),
            ));
        }

        if config.rules_help_base.trim().is_empty() || config.plugins_index_url.trim().is_empty() {
            return Err(AssistError::ConfigError(
                "Help URLs cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Install a stderr `fmt` subscriber at the configured level
pub fn init_logging(config: &LoggingConfig) -> AssistResult<()> {
    use tracing_subscriber::fmt;

    let level = match config.level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    fmt()
        .with_max_level(level)
        .with_target(config.debug)
        .with_thread_ids(config.debug)
        .with_file(config.debug)
        .with_line_number(config.debug)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AssistError::ConfigError(format!("Logging already initialized: {}", e)))
}
