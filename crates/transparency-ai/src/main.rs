mod assistant;
mod catalog;
mod config;
mod error;
mod prompt;
mod recommendations;
mod scoring;
mod server;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use transparency_common::llm::LlmClient;

use assistant::AiAssistant;
use config::Config;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before the subscriber so RUST_LOG may come from .env too.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(
            std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        ))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    // A missing .env file is fine; real deployments set the environment directly.
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "failed to load .env file");
        }
    }

    info!("starting transparency-ai service");

    let config = Config::from_env()?;
    let assistant = match &config.llm {
        Some(llm) => {
            let assistant = AiAssistant::new(LlmClient::new(llm.clone())?);
            info!(
                base_url = %llm.base_url,
                model = assistant.model(),
                timeout_ms = llm.timeout.as_millis(),
                "AI features enabled"
            );
            Some(assistant)
        }
        None => {
            warn!("GEMINI_API_KEY not set, AI features disabled");
            None
        }
    };

    let app = server::router(AppState::new(assistant));

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, ai = config.ai_enabled(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("transparency-ai shut down");
    Ok(())
}

/// INFO unless `directives` (the RUST_LOG value) says otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
