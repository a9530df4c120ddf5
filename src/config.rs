//! Configuration types for the college finder.
//!
//! Loaded from TOML; every section and field falls back to its default,
//! so an empty file is a valid config.

use std::path::{Path, PathBuf};

use finder_search::ExtractConfig;
use serde::{Deserialize, Serialize};

use crate::error::{FinderError, Result};
use crate::spreadsheet::SheetFormat;
use crate::view::ViewMode;

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Extraction service settings.
    pub gemini: GeminiSection,
    /// Batch execution settings.
    pub batch: BatchSection,
    /// Presentation and export defaults.
    pub output: OutputSection,
}

/// `[gemini]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSection {
    /// Model name, e.g. `gemini-3-flash-preview`.
    pub model: String,
    /// API base URL.
    pub base_url: String,
    /// Ground answers with web search.
    pub web_search: bool,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// API key. Prefer the `GEMINI_API_KEY` environment variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for GeminiSection {
    fn default() -> Self {
        let defaults = ExtractConfig::default();
        Self {
            model: defaults.model,
            base_url: defaults.base_url,
            web_search: defaults.web_search,
            timeout_seconds: defaults.timeout_seconds,
            api_key: None,
        }
    }
}

/// `[batch]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSection {
    /// Maximum requests in flight.
    pub concurrency: usize,
    /// Lifetime of cached records in seconds (0 disables the cache).
    pub cache_ttl_seconds: u64,
}

impl Default for BatchSection {
    fn default() -> Self {
        let defaults = ExtractConfig::default();
        Self {
            concurrency: defaults.concurrency,
            cache_ttl_seconds: defaults.cache_ttl_seconds,
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Default results view.
    pub view: ViewMode,
    /// Default export format.
    pub export_format: SheetFormat,
}

impl FinderConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| FinderError::Config(e.to_string()))
    }

    /// Load the config at `path` if it exists, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FinderError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/college-finder/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config)
                .join("college-finder")
                .join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("college-finder")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/college-finder-config/config.toml")
        }
    }

    /// Returns the default session path: `~/.local/share/college-finder/session.json`.
    pub fn default_session_path() -> PathBuf {
        if let Some(data) = std::env::var_os("XDG_DATA_HOME") {
            PathBuf::from(data)
                .join("college-finder")
                .join("session.json")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("college-finder")
                .join("session.json")
        } else {
            PathBuf::from("/tmp/college-finder/session.json")
        }
    }

    /// Extraction settings for the engine crate.
    pub fn extract_config(&self) -> ExtractConfig {
        ExtractConfig {
            model: self.gemini.model.clone(),
            base_url: self.gemini.base_url.clone(),
            timeout_seconds: self.gemini.timeout_seconds,
            web_search: self.gemini.web_search,
            concurrency: self.batch.concurrency,
            cache_ttl_seconds: self.batch.cache_ttl_seconds,
        }
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Search`] wrapping the engine's config error.
    pub fn validate(&self) -> Result<()> {
        self.extract_config().validate()?;
        Ok(())
    }

    /// Resolve the API key: explicit value first, then the environment
    /// variables in [`API_KEY_ENV_VARS`], then the config file.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Config`] if no non-blank key is found.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Result<String> {
        self.resolve_api_key_with(explicit, |name| std::env::var(name).ok())
    }

    /// [`Self::resolve_api_key`] with the environment read through `lookup`.
    fn resolve_api_key_with(
        &self,
        explicit: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String> {
        let from_env = API_KEY_ENV_VARS
            .iter()
            .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()));
        [explicit.map(str::to_owned), from_env, self.gemini.api_key.clone()]
            .into_iter()
            .flatten()
            .map(|key| key.trim().to_owned())
            .find(|key| !key.is_empty())
            .ok_or_else(|| {
                FinderError::Config(format!(
                    "no API key: pass --api-key, set {}, or add api_key under [gemini]",
                    API_KEY_ENV_VARS.join(" or ")
                ))
            })
    }
}
