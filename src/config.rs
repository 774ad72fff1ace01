//! Client and per-call configuration.
//!
//! [`GenerateOptions`] holds what changes per call (model, sampling, streaming);
//! [`ClientConfig`] holds what is fixed for a client (endpoint, timeouts, extra
//! headers) plus the default options. Both deserialize from TOML:
//!
//! ```toml
//! endpoint = "https://api.deepinfra.com/v1/openai/chat/completions"
//! timeout_secs = 120
//! max_consecutive_malformed = 32
//!
//! [headers]
//! X-Deepinfra-Source = "web-page"
//!
//! [generate]
//! model = "meta-llama/Meta-Llama-3-8B-Instruct"
//! max_tokens = 256
//! temperature = 0.5
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::models::DEFAULT_MODEL;

/// The endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.deepinfra.com/v1/openai/chat/completions";

/// The system prompt used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "Be Helpful and Friendly. Keep your response straightforward, short and concise";

const DEFAULT_MAX_CONSECUTIVE_MALFORMED: usize = 32;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Options for a single `generate` call.
///
/// # Examples
///
/// ```
/// use sentstream::config::GenerateOptions;
///
/// let options = GenerateOptions::default()
///     .model("mistralai/Mistral-7B-Instruct-v0.2")
///     .max_tokens(128)
///     .stream(false);
///
/// assert_eq!(options.max_tokens, 128);
/// assert_eq!(options.temperature, 0.7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Model identifier; any string is accepted.
    pub model: String,
    /// Prepended to the transmitted history as a `system` message.
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Stream the reply sentence by sentence instead of waiting for the full text.
    pub stream: bool,
    /// Read-buffer capacity for the response body, in bytes.
    pub chunk_size: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
            max_tokens: 512,
            temperature: 0.7,
            stream: true,
            chunk_size: 1,
        }
    }
}

impl GenerateOptions {
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Checks the values an upstream would reject or the client cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".into()));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be at least 1".into()));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "temperature must be a non-negative number, got {}",
                self.temperature
            )));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Settings fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Chat-completion URL the requests are posted to.
    pub endpoint: String,
    /// Overall per-request timeout, body included. `None` waits forever.
    pub timeout_secs: Option<u64>,
    /// How many malformed frames in a row a stream tolerates before giving up.
    /// `None` (only settable from code) never gives up.
    pub max_consecutive_malformed: Option<usize>,
    /// Extra request headers; these override the client's defaults.
    pub headers: BTreeMap<String, String>,
    /// Options used by calls that do not pass their own.
    pub generate: GenerateOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout_secs: None,
            max_consecutive_malformed: Some(DEFAULT_MAX_CONSECUTIVE_MALFORMED),
            headers: BTreeMap::new(),
            generate: GenerateOptions::default(),
        }
    }
}

impl ClientConfig {
    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_owned(),
            source: e,
        })?;
        Self::from_toml_str(&source)
    }

    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn max_consecutive_malformed(mut self, limit: Option<usize>) -> Self {
        self.max_consecutive_malformed = limit;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let scheme_ok = self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://");
        if !scheme_ok {
            return Err(ConfigError::Invalid(format!(
                "endpoint must be an http(s) URL, got {:?}",
                self.endpoint
            )));
        }
        if self.max_consecutive_malformed == Some(0) {
            return Err(ConfigError::Invalid(
                "max_consecutive_malformed must be at least 1".into(),
            ));
        }
        self.generate.validate()
    }
}
