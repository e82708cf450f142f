//! Chat-completion client configuration.
//!
//! Resolved once at startup from raw environment values. A missing API key means generation is
//! disabled rather than misconfigured.

use std::time::Duration;

use scribe_core::GenerationError;

/// Default OpenAI-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// System message sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str =
    "You are a clinical documentation assistant. Follow the requested section layout exactly.";

#[derive(Clone)]
pub struct ChatConfig {
    base_url: String,
    model: String,
    api_key: String,
    temperature: Option<f32>,
    timeout: Option<Duration>,
}

// Debug output omits the API key.
impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ChatConfig {
    /// Create a new `ChatConfig`. A trailing `/` on `base_url` is dropped.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Configuration` if the URL, model or key is blank.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let model = model.into().trim().to_string();
        let api_key = api_key.into().trim().to_string();

        if base_url.is_empty() {
            return Err(GenerationError::Configuration(
                "base URL cannot be empty".into(),
            ));
        }
        if model.is_empty() {
            return Err(GenerationError::Configuration(
                "model cannot be empty".into(),
            ));
        }
        if api_key.is_empty() {
            return Err(GenerationError::Configuration(
                "API key cannot be empty".into(),
            ));
        }

        Ok(Self {
            base_url,
            model,
            api_key,
            temperature: None,
            timeout: None,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Raw environment values for [`chat_config_from_env_values`].
#[derive(Debug, Default, Clone)]
pub struct ChatEnv {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<String>,
    pub timeout_secs: Option<String>,
}

impl ChatEnv {
    /// Reads `SCRIBE_CHAT_BASE_URL`, `SCRIBE_CHAT_MODEL`, `OPENAI_API_KEY`,
    /// `SCRIBE_CHAT_TEMPERATURE` and `SCRIBE_CHAT_TIMEOUT_SECS`.
    pub fn from_process_env() -> Self {
        Self {
            base_url: std::env::var("SCRIBE_CHAT_BASE_URL").ok(),
            model: std::env::var("SCRIBE_CHAT_MODEL").ok(),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            temperature: std::env::var("SCRIBE_CHAT_TEMPERATURE").ok(),
            timeout_secs: std::env::var("SCRIBE_CHAT_TIMEOUT_SECS").ok(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve chat configuration from raw values.
///
/// Returns `Ok(None)` when no API key is set.
///
/// # Errors
///
/// Returns `GenerationError::Configuration` if the temperature or timeout is not a number.
pub fn chat_config_from_env_values(env: ChatEnv) -> Result<Option<ChatConfig>, GenerationError> {
    let Some(api_key) = non_blank(env.api_key) else {
        return Ok(None);
    };

    let mut config = ChatConfig::new(
        non_blank(env.base_url).unwrap_or_else(|| DEFAULT_BASE_URL.into()),
        non_blank(env.model).unwrap_or_else(|| DEFAULT_MODEL.into()),
        api_key,
    )?;

    if let Some(raw) = non_blank(env.temperature) {
        let temperature = raw.parse::<f32>().map_err(|e| {
            GenerationError::Configuration(format!("invalid temperature '{raw}': {e}"))
        })?;
        config = config.with_temperature(temperature);
    }

    if let Some(raw) = non_blank(env.timeout_secs) {
        let secs = raw.parse::<u64>().map_err(|e| {
            GenerationError::Configuration(format!("invalid timeout '{raw}': {e}"))
        })?;
        config = config.with_timeout(Duration::from_secs(secs));
    }

    Ok(Some(config))
}
