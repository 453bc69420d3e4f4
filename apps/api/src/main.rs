mod config;
mod copilot;
mod errors;
mod interview;
mod llm_client;
mod routes;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::copilot::job_description::{JobDescriptionWriter, LlmJobDescriptionWriter};
use crate::interview::follow_up::{LlmQuestionGenerator, QuestionGenerator};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the LLM-backed generators when an API key is present
    let (generator, writer): (
        Option<Arc<dyn QuestionGenerator>>,
        Option<Arc<dyn JobDescriptionWriter>>,
    ) = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            let generator: Arc<dyn QuestionGenerator> =
                Arc::new(LlmQuestionGenerator::new(llm.clone()));
            let writer: Arc<dyn JobDescriptionWriter> = Arc::new(LlmJobDescriptionWriter::new(llm));
            (Some(generator), Some(writer))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; follow-ups come from the question bank and the copilot is unavailable");
            (None, None)
        }
    };
    info!(
        "Follow-up timeout: {}s, chat session TTL: {}s",
        config.follow_up_timeout.as_secs(),
        config.chat_session_ttl.as_secs()
    );

    // Build app state
    let state = AppState::new(config.clone(), generator, writer);

    spawn_chat_session_sweeper(state.clone());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically evicts chat interviews nobody has answered for a while.
/// Live interviews end with their connection and are not swept.
fn spawn_chat_session_sweeper(state: AppState) {
    let ttl = match chrono::Duration::from_std(state.config.chat_session_ttl) {
        Ok(ttl) => ttl,
        Err(e) => {
            warn!("Chat session TTL out of range, idle sweeping disabled: {e}");
            return;
        }
    };
    let period = state.config.chat_session_sweep.max(std::time::Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let removed = state
                .chat_interviews
                .store()
                .purge_idle(ttl, chrono::Utc::now());
            if removed > 0 {
                info!(removed, "Evicted idle chat interviews");
            } else {
                debug!("Chat session sweep: nothing to evict");
            }
        }
    });
}
