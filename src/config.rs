//! Startup configuration.
//!
//! Everything is read once, when the binary starts, and handed to the
//! services that need it. Nothing below `main` looks at the environment.

use std::env;
use std::path::Path;

use anyhow::{Context, Result};

use crate::api_connection::endpoints::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
pub const FALLBACK_API_KEY_ENV_VAR: &str = "API_KEY";
pub const MODEL_ENV_VAR: &str = "RECIPE_GENIE_MODEL";
pub const BASE_URL_ENV_VAR: &str = "GEMINI_BASE_URL";

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

// Keep the key out of logs and panics.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Builds a config from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            api_key: non_blank(API_KEY_ENV_VAR).or_else(|| non_blank(FALLBACK_API_KEY_ENV_VAR)),
            model: non_blank(MODEL_ENV_VAR).unwrap_or(defaults.model),
            base_url: non_blank(BASE_URL_ENV_VAR).unwrap_or(defaults.base_url),
        }
    }

    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads settings from a dotenv-style file only, ignoring the process environment.
    // `from_path_iter` is deprecated in dotenv 0.15, but it is the only entry point
    // that parses a file without exporting its variables into the process.
    #[allow(deprecated)]
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let entries = dotenv::from_path_iter(path)
            .with_context(|| format!("Failed to open env file '{}'", path.display()))?
            .collect::<Result<Vec<(String, String)>, _>>()
            .with_context(|| format!("Failed to parse env file '{}'", path.display()))?;
        Ok(Self::from_lookup(|name| {
            entries
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        }))
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        self
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
