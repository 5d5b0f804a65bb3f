//! Courrier Server
//!
//! Turns free-text requests into Swiss administrative letters. Provides REST
//! API endpoints for:
//!
//! - Template listing and lookup
//! - Request analysis (template routing and field extraction)
//! - Document generation (HTML, with a placeholder draft when data is missing)
//!
//! ## Architecture
//!
//! Routing and extraction go through an OpenAI client when `OPENAI_API_KEY`
//! is set; keyword and regex fallbacks always back it up. User profiles come
//! from a JSON fixture file, and fixed session tokens are seeded from it.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    routing::{delete, get, post},
    Router,
};
use clap::Parser;
use intake_engine::{
    CombinedExtractor, DataExtractor, RequestClassifier, RequestRouter, UserDataProvider,
};
use template_engine::templates::{DirectoryTemplates, EmbeddedTemplates, LayeredTemplates};
use template_engine::TemplateStore;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod llm;
mod pipeline;
mod sessions;
mod state;
#[cfg(test)]
mod tests;
mod users;

use api::{
    handle_analyze, handle_create_session, handle_generate, handle_get_template, handle_health,
    handle_list_templates, handle_logout,
};
use llm::OpenAiClient;
use sessions::{InMemorySessionStore, SessionStore};
use state::AppState;
use users::JsonUserDirectory;

/// Command-line arguments for the Courrier server
#[derive(Parser, Debug)]
#[command(name = "courrier-server")]
#[command(about = "Letter routing and document assembly server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Directory of JSON template definitions, layered over the embedded ones
    #[arg(long, env = "COURRIER_TEMPLATES_DIR")]
    templates_dir: Option<PathBuf>,

    /// JSON file of user profiles and session tokens
    #[arg(long, env = "COURRIER_USERS_FILE")]
    users_file: Option<PathBuf>,

    /// Timeout for classifier and extractor calls in milliseconds
    #[arg(long, env = "COURRIER_AI_TIMEOUT_MS", default_value = "8000")]
    ai_timeout_ms: u64,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Lifetime of sessions opened through POST /api/sessions
    #[arg(long, env = "COURRIER_SESSION_TTL_HOURS", default_value = "24")]
    session_ttl_hours: i64,

    /// Model used for classification and extraction
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    openai_model: String,

    /// API key; without it only the keyword and regex fallbacks run
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Alternative OpenAI-compatible endpoint
    #[arg(long, env = "OPENAI_BASE_URL")]
    openai_base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// All routes, without transport middleware
pub fn routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // Templates
        .route("/api/templates", get(handle_list_templates))
        .route("/api/templates/:id", get(handle_get_template))
        // Documents
        .route("/api/documents/analyze", post(handle_analyze))
        .route("/api/documents/generate", post(handle_generate))
        // Sessions
        .route("/api/sessions", post(handle_create_session))
        .route("/api/sessions/current", delete(handle_logout))
        .with_state(state)
}

async fn build_state(args: &Args) -> anyhow::Result<AppState> {
    let templates: Arc<dyn TemplateStore> = match &args.templates_dir {
        Some(dir) => {
            let custom = DirectoryTemplates::load(dir)
                .with_context(|| format!("loading templates from {}", dir.display()))?;
            info!("Loaded {} custom templates from {}", custom.len(), dir.display());
            Arc::new(
                LayeredTemplates::new()
                    .with_layer(Arc::new(custom))
                    .with_layer(Arc::new(EmbeddedTemplates)),
            )
        }
        None => Arc::new(EmbeddedTemplates),
    };

    let directory = match &args.users_file {
        Some(path) => JsonUserDirectory::load(path)
            .with_context(|| format!("loading users from {}", path.display()))?,
        None => JsonUserDirectory::default(),
    };
    if directory.is_empty() {
        warn!("No user profiles loaded, every profile field will be missing");
    } else {
        info!("Loaded {} user profiles", directory.len());
    }

    let sessions = Arc::new(InMemorySessionStore::new(chrono::Duration::hours(
        args.session_ttl_hours,
    )));
    for session in directory.seed_sessions() {
        sessions.restore(session).await;
    }
    spawn_session_purge(sessions.clone());

    let timeout = Duration::from_millis(args.ai_timeout_ms);
    let (classifier, extractor): (
        Option<Arc<dyn RequestClassifier>>,
        Option<Arc<dyn DataExtractor>>,
    ) = match args.openai_api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => {
            let mut client = OpenAiClient::new(key, &args.openai_model);
            if let Some(url) = &args.openai_base_url {
                client = client.with_base_url(url);
            }
            let client = Arc::new(client);
            info!("Language model routing enabled ({})", args.openai_model);
            let classifier: Arc<dyn RequestClassifier> = client.clone();
            let extractor: Arc<dyn DataExtractor> = client;
            (Some(classifier), Some(extractor))
        }
        None => {
            info!("OPENAI_API_KEY not set, using keyword routing and regex extraction");
            (None, None)
        }
    };

    let users: Arc<dyn UserDataProvider> = Arc::new(directory);
    Ok(AppState {
        templates,
        router: RequestRouter::new(classifier, timeout),
        extractor: CombinedExtractor::new(extractor, timeout),
        users,
        sessions,
    })
}

/// Rate limiting, request tracing and CORS, outermost last
fn with_middleware(router: Router, rate_limit: u32) -> anyhow::Result<Router> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(rate_limit.into())
            .burst_size(rate_limit.saturating_mul(2))
            .finish()
            .context("invalid rate limit configuration")?,
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(router
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

/// Periodically drop expired sessions
fn spawn_session_purge(sessions: Arc<InMemorySessionStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(600));
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired().await;
            if purged > 0 {
                debug!("Purged {} expired sessions", purged);
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

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

    info!("Starting Courrier server on {}:{}", args.host, args.port);

    let state = build_state(&args).await?;
    let app = with_middleware(routes(state), args.rate_limit)?;

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("AI timeout: {}ms", args.ai_timeout_ms);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
