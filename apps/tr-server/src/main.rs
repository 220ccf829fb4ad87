//! Termo de Referência Server
//!
//! Serves the TR form surface and turns submissions into filled Word
//! documents. Provides REST API endpoints for:
//!
//! - Variant listing (fields, defaults, optional sections)
//! - Record preview with derived clauses
//! - .docx generation
//!
//! ## Architecture
//!
//! Every request binds its inputs in a fresh `FormBinder`; there is no
//! server-side session. Rendering runs on the blocking pool under a timeout.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use docx_engine::TemplateStore;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tr_binder::{Clock, SystemClock, VariantCatalog};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
#[cfg(test)]
mod tests;

use api::{handle_generate, handle_health, handle_list_variants, handle_preview};

/// Command-line arguments for the TR server
#[derive(Parser, Debug)]
#[command(name = "tr-server")]
#[command(about = "Termo de Referência generator server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Render timeout in milliseconds
    #[arg(long, default_value = "10000")]
    timeout_ms: u64,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Directory of `<name>.docx` files overriding the bundled templates
    #[arg(long, env = "TR_TEMPLATE_DIR")]
    template_dir: Option<PathBuf>,

    /// JSON file with the variant catalogue (defaults to the built-in forms)
    #[arg(long, env = "TR_VARIANTS")]
    variants: Option<PathBuf>,

    /// City printed in the place-and-date line
    #[arg(long, env = "TR_CITY")]
    city: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<VariantCatalog>,
    pub templates: Arc<TemplateStore>,
    pub clock: Arc<dyn Clock>,
    /// Render timeout in milliseconds
    pub timeout_ms: u64,
}

/// Routes without the network-facing middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/variants", get(handle_list_variants))
        .route("/api/preview", post(handle_preview))
        .route("/api/generate", post(handle_generate))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TR server on {}:{}", args.host, args.port);

    let mut catalog = match &args.variants {
        Some(path) => VariantCatalog::from_json_file(path)
            .with_context(|| format!("loading variants from {}", path.display()))?,
        None => VariantCatalog::builtin(),
    };
    if let Some(city) = &args.city {
        catalog = catalog.with_city(city);
    }

    let templates = match &args.template_dir {
        Some(dir) => TemplateStore::with_dir(dir),
        None => TemplateStore::embedded(),
    };
    if let Some(dir) = templates.template_dir() {
        info!("Template overrides from {}", dir.display());
    }

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .context("invalid rate limiter configuration")?,
    );

    // Create shared state
    let state = AppState {
        catalog: Arc::new(catalog),
        templates: Arc::new(templates),
        clock: Arc::new(SystemClock),
        timeout_ms: args.timeout_ms,
    };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Apply middleware
    let app = build_router(state)
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Render timeout: {}ms", args.timeout_ms);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
