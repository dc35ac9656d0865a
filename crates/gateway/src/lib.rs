//! PaperDash API Gateway
//!
//! HTTP surface of the paper dashboard:
//! - Paper listing backed by the fetch service
//! - Rating reads and writes backed by the rating store
//! - Chat-with-paper stub
//! - Health and readiness probes

pub mod handlers;
pub mod middleware;

use axum::{
    http::{HeaderName, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use paperdash_common::{
    config::{AppConfig, CorsConfig},
    errors::Result,
    papers::{open_source, PaperService},
    ratings::RatingStore,
    storage::open_slot,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Rating store shared by all handlers
pub type SharedRatings = Arc<RwLock<RatingStore>>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub ratings: SharedRatings,
    pub papers: PaperService,
}

impl AppState {
    pub fn new(config: AppConfig, ratings: RatingStore, papers: PaperService) -> Self {
        Self {
            config: Arc::new(config),
            ratings: Arc::new(RwLock::new(ratings)),
            papers,
        }
    }

    /// Build the store and fetch service described by `config`.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let slot = open_slot(&config.storage)?;
        let ratings = RatingStore::load(slot, config.storage.ratings_key.clone());

        let source = open_source(&config.fetch)?;
        let papers = PaperService::new(source, config.fetch_delay());

        info!(
            ratings = ratings.len(),
            source = papers.source_name(),
            delay_ms = config.fetch.delay_ms,
            "Application state ready"
        );

        Ok(Self::new(config, ratings, papers))
    }
}

/// Response header carrying the server-side handling time in seconds
pub const PROCESS_TIME_HEADER: &str = "x-process-time";

/// Build the CORS layer from config.
///
/// Entries that are not valid origins or methods are skipped with a warning.
/// With credentials enabled, wildcards are answered by mirroring the request.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let wildcard = config.origins.iter().any(|o| o == "*");
    let origin = if wildcard {
        if config.allow_credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::from(Any)
        }
    } else {
        AllowOrigin::list(config.origins.iter().filter_map(|o| {
            HeaderValue::from_str(o)
                .map_err(|_| warn!(origin = %o, "Ignoring invalid CORS origin"))
                .ok()
        }))
    };

    let methods: Vec<Method> = config
        .methods
        .iter()
        .filter_map(|m| {
            Method::from_bytes(m.trim().to_uppercase().as_bytes())
                .map_err(|_| warn!(method = %m, "Ignoring invalid CORS method"))
                .ok()
        })
        .collect();

    let headers = if config.allow_credentials {
        AllowHeaders::mirror_request()
    } else {
        AllowHeaders::from(Any)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.allow_credentials)
        .expose_headers([
            HeaderName::from_static(PROCESS_TIME_HEADER),
            HeaderName::from_static("x-request-id"),
        ])
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Paper endpoints
        .route("/papers", get(handlers::papers::list_papers))
        .route("/papers/{paper_id}/chat", post(handlers::chat::chat))

        // Rating endpoints
        .route(
            "/ratings",
            get(handlers::ratings::list_ratings).delete(handlers::ratings::clear_ratings),
        )
        .route(
            "/ratings/{paper_id}",
            get(handlers::ratings::get_rating).put(handlers::ratings::update_rating),
        );

    Router::new()
        .nest("/v2", api_routes)
        .layer(from_fn(middleware::request_metrics::track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        // Outermost, so the id exists before it is propagated
        .layer(request_id)
        .with_state(state)
}
