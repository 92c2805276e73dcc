mod analysis;
mod auth;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod quota;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::SupabaseAuth;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::quota::{store::PgUsageStore, QuotaGate};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Bidlyze API v{}", env!("CARGO_PKG_VERSION"));

    // Usage records live in Postgres
    let db = create_pool(&config.database_url).await?;
    let quota = QuotaGate::new(
        Arc::new(PgUsageStore::new(db)),
        config.analysis.monthly_limit,
    );
    info!(
        "Quota gate initialized ({} analyses per month)",
        config.analysis.monthly_limit
    );

    let request_timeout = Duration::from_secs(config.request_timeout_secs);

    let llm = LlmClient::new(config.gemini_api_key.clone(), request_timeout);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let auth = SupabaseAuth::new(&config.supabase_url, config.supabase_anon_key.clone());

    info!(
        "Upload ceiling {} bytes, PDF strategy {:?}",
        config.analysis.max_upload_bytes, config.analysis.pdf_strategy
    );

    let state = AppState {
        auth: Arc::new(auth),
        quota,
        model: Arc::new(llm),
        settings: config.analysis,
    };

    let app = build_router(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the frontend host once it is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
