use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TRANSCRIPT_CHARS: usize = 15_000;
pub const DEFAULT_SUPADATA_URL: &str = "https://api.supadata.ai/v1";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OEMBED_URL: &str = "https://www.youtube.com/oembed";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

pub const SUPADATA_KEY_VAR: &str = "SUPADATA_API_KEY";
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";

/// Optional settings from ~/.config/ytdigest/config.toml
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub bind: Option<String>,
    pub model: Option<String>,
    pub max_transcript_chars: Option<usize>,
    pub supadata_url: Option<String>,
    pub openai_url: Option<String>,
    pub oembed_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from `path` if it exists, defaults otherwise
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytdigest")
        .join("config.toml")
}

/// API keys read from the process environment
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub supadata: Option<String>,
    pub openai: Option<String>,
}

impl ApiKeys {
    pub fn from_env() -> Self {
        Self {
            supadata: non_empty_var(SUPADATA_KEY_VAR),
            openai: non_empty_var(OPENAI_KEY_VAR),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Fully resolved settings handed to the analyzer
#[derive(Debug, Clone)]
pub struct Settings {
    pub keys: ApiKeys,
    pub model: String,
    pub max_transcript_chars: usize,
    pub supadata_url: String,
    pub openai_url: String,
    pub oembed_url: String,
    pub request_timeout: Duration,
}

impl Settings {
    /// Merge the config file over built-in defaults; `model` (from the CLI) wins when given
    pub fn resolve(config: &Config, keys: ApiKeys, model: Option<String>) -> Self {
        Self {
            keys,
            model: model
                .or_else(|| config.model.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_transcript_chars: config.max_transcript_chars.unwrap_or(DEFAULT_MAX_TRANSCRIPT_CHARS),
            supadata_url: trim_url(config.supadata_url.as_deref().unwrap_or(DEFAULT_SUPADATA_URL)),
            openai_url: trim_url(config.openai_url.as_deref().unwrap_or(DEFAULT_OPENAI_URL)),
            oembed_url: config
                .oembed_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OEMBED_URL.to_string()),
            request_timeout: Duration::from_secs(config.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(&Config::default(), ApiKeys::default(), None)
    }
}

fn trim_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
bind = "0.0.0.0:8080"
model = "gpt-4o-mini"
max_transcript_chars = 8000
supadata_url = "http://localhost:9000/v1/"
request_timeout_secs = 30
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bind.as_deref(), Some("0.0.0.0:8080"));
        assert_eq!(config.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.max_transcript_chars, Some(8000));
        assert_eq!(config.request_timeout_secs, Some(30));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.bind.is_none());
        assert!(config.model.is_none());
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.max_transcript_chars, 15_000);
        assert_eq!(settings.supadata_url, DEFAULT_SUPADATA_URL);
        assert_eq!(settings.request_timeout, Duration::from_secs(120));
        assert!(settings.keys.supadata.is_none());
    }

    #[test]
    fn test_resolve_precedence() {
        let config: Config = toml::from_str(
            r#"
model = "gpt-4o-mini"
supadata_url = "http://localhost:9000/v1/"
"#,
        )
        .unwrap();
        let settings = Settings::resolve(&config, ApiKeys::default(), None);
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.supadata_url, "http://localhost:9000/v1");

        let settings = Settings::resolve(&config, ApiKeys::default(), Some("gpt-4o".to_string()));
        assert_eq!(settings.model, "gpt-4o");
    }

    #[test]
    fn test_load_missing_file() {
        let config = Config::load_from(Path::new("/nonexistent/ytdigest/config.toml")).unwrap();
        assert!(config.model.is_none());
    }
}
