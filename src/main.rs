//! Application entry point for the `climascore-engine` service.
//!
//! This binary orchestrates the startup sequence for the ClimaScore API:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Building the scoring engine (provider adapters + result cache)
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `CLIMA_PORT` (optional) – listen port (default: 8080)
//! - `CLIMA_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `CLIMA_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! See `config.rs` for the provider, timeout, cache and loan settings.
use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use climascore_engine::{config, routes, ClimateEngine};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let engine = ClimateEngine::from_config(&cfg)
        .map_err(|e| anyhow::anyhow!("Failed to build provider HTTP client: {}", e))?;

    tracing::info!(
        "Scoring engine ready with sources: {:?}",
        engine.sources().iter().map(|s| s.id()).collect::<Vec<_>>()
    );

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(Arc::new(engine));

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `CLIMA_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by `RUST_LOG`, else the `CLIMA_LOG_LEVEL` env var
///
/// Called once at startup before any logging macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("CLIMA_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("CLIMA_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},hyper=info,reqwest=info"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
