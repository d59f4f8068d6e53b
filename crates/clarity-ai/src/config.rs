use std::time::Duration;

use crate::ConfigError;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Older deployments export the key under this name.
pub const LEGACY_API_KEY_ENV: &str = "API_KEY";
pub const MODEL_ENV: &str = "CLARITY_MODEL";
pub const BASE_URL_ENV: &str = "CLARITY_BASE_URL";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the inference service.
///
/// The API key is optional here so a client can be built without one; every
/// gateway call checks it first and fails with [`ConfigError::MissingApiKey`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    ///
    /// `GEMINI_API_KEY` wins over `API_KEY`; `CLARITY_MODEL` and
    /// `CLARITY_BASE_URL` override the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_key: lookup(API_KEY_ENV).or_else(|| lookup(LEGACY_API_KEY_ENV)),
            model: lookup(MODEL_ENV).unwrap_or(defaults.model),
            base_url: lookup(BASE_URL_ENV).unwrap_or(defaults.base_url),
            timeout: defaults.timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured key, trimmed. Blank keys count as missing.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey { var: API_KEY_ENV })
    }

    /// Base URL without a trailing slash, rejected unless http(s).
    pub fn normalized_base_url(&self) -> Result<String, ConfigError> {
        let url = self.base_url.trim().trim_end_matches('/');
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(url.to_string())
    }
}
