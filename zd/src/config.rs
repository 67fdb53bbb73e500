//! ZenDo configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::Priority;
use crate::llm::LlmError;
use crate::storage::JsonFileRepository;
use crate::view::DEFAULT_DATE_FORMAT;

/// Generic key variable checked when the provider-specific one is unset
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";

/// Main ZenDo configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub log_level: Option<String>,

    /// LLM provider configuration for task breakdown
    pub llm: LlmConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Terminal UI configuration
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// `--config` path, then `./.zendo.yml`, then
    /// `~/.config/zendo/zendo.yml`, then defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::default_locations() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is initialized
    ///
    /// Errors are swallowed; the full load reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let paths: Vec<PathBuf> = match config_path {
            Some(p) => vec![p.clone()],
            None => Self::default_locations(),
        };
        paths
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".zendo.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("zendo").join("zendo.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Anthropic,
    OpenAI,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-3-flash-preview",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::OpenAI => "gpt-4o-mini",
        }
    }

    fn default_api_key_env(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::Anthropic => "https://api.anthropic.com",
            Self::OpenAI => "https://api.openai.com",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// LLM provider configuration
///
/// `model`, `api-key-env` and `base-url` default per provider when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LlmConfig {
    pub provider: LlmProvider,

    /// Model identifier
    pub model: Option<String>,

    /// Environment variable containing the API key
    pub api_key_env: Option<String>,

    /// API base URL
    pub base_url: Option<String>,

    /// Maximum tokens per response
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// Retries for transient failures
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: None,
            api_key_env: None,
            base_url: None,
            max_tokens: 1024,
            timeout_ms: 30_000,
            max_retries: 3,
        }
    }
}

impl LlmConfig {
    /// Fill provider defaults into a fully specified config
    pub fn resolve(&self) -> ResolvedLlmConfig {
        let provider = self.provider;
        ResolvedLlmConfig {
            provider,
            model: self
                .model
                .clone()
                .unwrap_or_else(|| provider.default_model().to_string()),
            api_key_env: self
                .api_key_env
                .clone()
                .unwrap_or_else(|| provider.default_api_key_env().to_string()),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| provider.default_base_url().to_string())
                .trim_end_matches('/')
                .to_string(),
            max_tokens: self.max_tokens,
            timeout_ms: self.timeout_ms,
            max_retries: self.max_retries,
        }
    }
}

/// LLM configuration with all provider defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key_env: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl ResolvedLlmConfig {
    /// Read the API key from the configured environment variable
    ///
    /// Falls back to `API_KEY` when the configured variable is unset or empty.
    pub fn get_api_key(&self) -> Result<String, LlmError> {
        [self.api_key_env.as_str(), FALLBACK_API_KEY_ENV]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
            .ok_or_else(|| LlmError::MissingApiKey(self.api_key_env.clone()))
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Task file path (default: `~/.local/share/zendo/zendo-todos.json`)
    pub data_file: Option<String>,
}

impl StorageConfig {
    /// Resolved task file path, with `~/` expanded
    pub fn data_file(&self) -> PathBuf {
        match &self.data_file {
            Some(p) => expand_home(p),
            None => JsonFileRepository::default_path(),
        }
    }
}

/// Terminal UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UiConfig {
    /// Event poll interval in milliseconds
    pub tick_rate_ms: u64,

    /// chrono format string for task dates
    pub date_format: String,

    /// Priority preselected for new tasks
    pub default_priority: Priority,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            default_priority: Priority::Medium,
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, LlmProvider::Gemini);
        assert_eq!(config.llm.max_retries, 3);
        assert_eq!(config.ui.default_priority, Priority::Medium);
        assert_eq!(config.ui.date_format, "%Y-%m-%d");
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_resolve_provider_defaults() {
        let resolved = LlmConfig::default().resolve();
        assert_eq!(resolved.model, "gemini-3-flash-preview");
        assert_eq!(resolved.api_key_env, "GEMINI_API_KEY");
        assert_eq!(resolved.base_url, "https://generativelanguage.googleapis.com");

        let anthropic = LlmConfig {
            provider: LlmProvider::Anthropic,
            ..Default::default()
        }
        .resolve();
        assert!(anthropic.model.contains("sonnet"));
        assert_eq!(anthropic.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(anthropic.base_url, "https://api.anthropic.com");
    }

    #[test]
    fn test_resolve_trims_trailing_slash() {
        let resolved = LlmConfig {
            base_url: Some("https://proxy.example.com/".to_string()),
            ..Default::default()
        }
        .resolve();
        assert_eq!(resolved.base_url, "https://proxy.example.com");
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug
llm:
  provider: openai
  model: gpt-4.1-mini
  api-key-env: MY_KEY
  max-tokens: 512
  timeout-ms: 10000
storage:
  data-file: /tmp/zendo-test.json
ui:
  tick-rate-ms: 50
  date-format: "%d/%m/%Y"
  default-priority: high
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.llm.provider, LlmProvider::OpenAI);
        assert_eq!(config.llm.model.as_deref(), Some("gpt-4.1-mini"));
        assert_eq!(config.llm.max_tokens, 512);
        assert_eq!(config.storage.data_file(), PathBuf::from("/tmp/zendo-test.json"));
        assert_eq!(config.ui.tick_rate_ms, 50);
        assert_eq!(config.ui.default_priority, Priority::High);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gemini-2.5-flash
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(config.llm.provider, LlmProvider::Gemini);
        assert_eq!(config.llm.timeout_ms, 30_000);
        assert_eq!(config.ui.tick_rate_ms, 100);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let yaml = "llm:\n  provider: cohere\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/x/y.json"), home.join("x/y.json"));
        }
        assert_eq!(expand_home("/abs/y.json"), PathBuf::from("/abs/y.json"));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("zendo.yml");
        fs::write(&path, "log-level: warn\nui:\n  tick-rate-ms: 250\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.ui.tick_rate_ms, 250);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_missing_file_errors() {
        let path = PathBuf::from("/nonexistent/zendo.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    #[serial]
    fn test_get_api_key_from_configured_env() {
        let resolved = LlmConfig {
            api_key_env: Some("ZENDO_TEST_KEY".to_string()),
            ..Default::default()
        }
        .resolve();

        unsafe {
            std::env::remove_var(FALLBACK_API_KEY_ENV);
            std::env::set_var("ZENDO_TEST_KEY", "secret");
        }
        assert_eq!(resolved.get_api_key().unwrap(), "secret");

        unsafe {
            std::env::remove_var("ZENDO_TEST_KEY");
        }
        assert!(matches!(resolved.get_api_key(), Err(LlmError::MissingApiKey(ref v)) if v == "ZENDO_TEST_KEY"));
    }

    #[test]
    #[serial]
    fn test_get_api_key_falls_back_to_api_key() {
        let resolved = LlmConfig {
            api_key_env: Some("ZENDO_TEST_UNSET_KEY".to_string()),
            ..Default::default()
        }
        .resolve();

        unsafe {
            std::env::remove_var("ZENDO_TEST_UNSET_KEY");
            std::env::set_var(FALLBACK_API_KEY_ENV, "fallback");
        }
        assert_eq!(resolved.get_api_key().unwrap(), "fallback");

        unsafe {
            std::env::remove_var(FALLBACK_API_KEY_ENV);
        }
    }
}
