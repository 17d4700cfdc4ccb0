use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::framework::Framework;
use crate::provider::Provider;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub provider: Option<String>,
    pub default_model: Option<String>,
    pub framework: Option<String>,
    pub gemini_api_key: Option<String>,
    pub claude_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub ollama_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub export_dir: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some(Provider::default().as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn provider(&self) -> Provider {
        self.provider
            .as_deref()
            .and_then(Provider::from_str)
            .unwrap_or_default()
    }

    /// Configured model, falling back to the provider default when the
    /// stored model belongs to the configured provider only
    pub fn model_for(&self, provider: Provider) -> String {
        match (&self.default_model, provider == self.provider()) {
            (Some(model), true) => model.clone(),
            _ => provider.default_model().to_string(),
        }
    }

    pub fn framework(&self) -> Framework {
        self.framework
            .as_deref()
            .and_then(Framework::from_str)
            .unwrap_or_default()
    }

    pub fn ollama_url(&self) -> &str {
        self.ollama_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// API key for a provider: environment first, then the config file.
    /// Blank values count as unset in both places.
    pub fn api_key_for(&self, provider: Provider) -> Option<String> {
        env_key(env_names(provider)).or_else(|| self.stored_key(provider).cloned())
    }

    /// Returns the source of the API key for a provider: "env", "config", or None
    pub fn key_source(&self, provider: Provider) -> Option<&'static str> {
        if provider == Provider::Ollama {
            Some("local")
        } else if env_key(env_names(provider)).is_some() {
            Some("env")
        } else if self.stored_key(provider).is_some() {
            Some("config")
        } else {
            None
        }
    }

    pub fn set_api_key(&mut self, provider: Provider, key: &str) {
        let key = Some(key.trim().to_string());
        match provider {
            Provider::Gemini => self.gemini_api_key = key,
            Provider::Claude => self.claude_api_key = key,
            Provider::OpenAI => self.openai_api_key = key,
            Provider::Ollama => {}
        }
    }

    fn stored_key(&self, provider: Provider) -> Option<&String> {
        let key = match provider {
            Provider::Gemini => self.gemini_api_key.as_ref(),
            Provider::Claude => self.claude_api_key.as_ref(),
            Provider::OpenAI => self.openai_api_key.as_ref(),
            Provider::Ollama => None,
        };
        key.filter(|k| !k.trim().is_empty())
    }

    /// Where exported files land: configured dir, downloads, or the working dir
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("genui").join("config.json"))
    }
}

fn env_names(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        Provider::Claude => &["ANTHROPIC_API_KEY"],
        Provider::OpenAI => &["OPENAI_API_KEY"],
        Provider::Ollama => &[],
    }
}

/// First non-blank value among `names`
fn env_key(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
}
