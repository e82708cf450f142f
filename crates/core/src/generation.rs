//! Boundary to the hosted text-generation service.
//!
//! The core never performs network I/O itself. Callers inject a [`GenerationService`] (the HTTP
//! client lives in `scribe-chat`) so drafting can be exercised with [`StaticGenerator`].

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("could not reach generation service: {0}")]
    Transport(String),
    #[error("generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation service returned no content")]
    EmptyResponse,
    #[error("generation service misconfigured: {0}")]
    Configuration(String),
}

/// Turns prompt text into generated text.
///
/// Implementations make a single attempt; retries and cancellation are not part of the contract.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Returns the same canned reply for every prompt.
#[derive(Debug, Clone)]
pub struct StaticGenerator {
    reply: Result<String, GenerationError>,
}

impl StaticGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
        }
    }

    /// A generator whose every call fails with `error`.
    pub fn failing(error: GenerationError) -> Self {
        Self { reply: Err(error) }
    }
}

#[async_trait]
impl GenerationService for StaticGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.reply.clone()
    }
}
