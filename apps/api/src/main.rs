mod cli;
mod config;
mod conversation;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::conversation::engine::ChatEngine;
use crate::llm_client::build_chat_model;
use crate::routes::build_router;
use crate::state::AppState;

/// `cvchat-api` serves HTTP; `cvchat-api chat` runs the console driver.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Serve,
    Chat,
}

impl Mode {
    fn from_args() -> Result<Self> {
        match std::env::args().nth(1).as_deref() {
            None | Some("serve") => Ok(Mode::Serve),
            Some("chat") => Ok(Mode::Chat),
            Some(other) => anyhow::bail!("unknown command '{other}' (expected 'serve' or 'chat')"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mode = Mode::from_args()?;

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging. The console driver owns stdout, so logs go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting CV chat v{} in {:?} mode", env!("CARGO_PKG_VERSION"), mode);

    // Initialize LLM client
    let model = build_chat_model(&config)?;
    info!("LLM client initialized (model: {})", model.model_id());

    let engine = Arc::new(ChatEngine::new(model, config.engine_settings()));

    if mode == Mode::Chat {
        return cli::run(engine).await;
    }

    let state = AppState { engine };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once a web front-end is deployed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
