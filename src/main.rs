use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use scribe_chat::{ChatCompletionClient, ChatEnv, chat_config_from_env_values};
use scribe_core::{GenerationService, ScribeEnv, scribe_config_from_env_values};

/// Main entry point for the scribe service
///
/// Resolves configuration once, wires the chat-completion client in as the generation service
/// when an API key is present, and serves the REST API.
///
/// # Environment Variables
/// - `SCRIBE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `SCRIBE_SECTION_MARKER`, `SCRIBE_CONSULT_TOKEN`: literal layout tokens
/// - `SCRIBE_PROPHYLAXIS_RULE`, `SCRIBE_CLEARANCE_MODE`: drafting rule and vitals validation
/// - `OPENAI_API_KEY`, `SCRIBE_CHAT_BASE_URL`, `SCRIBE_CHAT_MODEL`,
///   `SCRIBE_CHAT_TEMPERATURE`, `SCRIBE_CHAT_TIMEOUT_SECS`: generation service
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - a configuration value is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scribe_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("scribe_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("SCRIBE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(scribe_config_from_env_values(ScribeEnv::from_process_env())?);

    let generator: Option<Arc<dyn GenerationService>> =
        match chat_config_from_env_values(ChatEnv::from_process_env())? {
            Some(chat_cfg) => {
                let client = ChatCompletionClient::new(chat_cfg)?;
                tracing::info!(
                    "++ Generation via {} ({})",
                    client.config().base_url(),
                    client.config().model()
                );
                Some(Arc::new(client))
            }
            None => None,
        };

    let state = AppState::new(cfg, generator);
    if !state.has_generator() {
        tracing::warn!("OPENAI_API_KEY is not set; /draft/ will answer 503");
    }

    tracing::info!("++ Starting scribe REST on {}", rest_addr);

    api_rest::serve(&rest_addr, state).await?;

    Ok(())
}
