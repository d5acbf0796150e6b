mod config;
mod errors;
mod ivr;
mod jobs;
mod models;
mod routes;
mod session;
mod state;
mod store;
#[cfg(test)]
mod test_support;
mod twiml;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::ivr::matcher::build_matcher;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting VoicePe v{}", env!("CARGO_PKG_VERSION"));
    info!(
        supabase_url = !config.supabase_url.is_empty(),
        supabase_key = !config.supabase_anon_key.is_empty(),
        twilio_sid = !config.twilio_account_sid.is_empty(),
        twilio_token = !config.twilio_auth_token.is_empty(),
        "Secrets loaded"
    );

    // Initialize worker/job store
    let store = store::connect(&config).await?;
    info!("Store backend: {:?}", config.store_backend);

    // Initialize call session store
    let sessions = session::connect(&config).await?;

    // Initialize job matcher (SubstringMatcher by default; swap via JOB_MATCHER)
    let matcher = build_matcher(config.job_matcher);
    info!(
        "Job matcher: {} (max re-prompts: {})",
        matcher.name(),
        config.max_reprompts
    );

    // Build app state
    let state = AppState {
        store,
        sessions,
        matcher,
        max_reprompts: config.max_reprompts,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
