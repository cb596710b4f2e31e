//! cms-admin library - content admin console service
//!
//! Serves the console pages and the admin JSON API. Content lives in the
//! content API behind [`backend::ContentBackend`]; this service caches it in
//! a [`ContentStore`] and keeps local form drafts in SQLite.

use axum::Router;
use cms_common::config::{self, ConfigOverrides, TomlConfig};
use cms_common::events::EventBus;
use cms_common::ContentStore;
use std::path::Path;
use std::sync::Arc;

pub mod api;
pub mod backend;
pub mod content;
pub mod drafts;
pub mod error;

use backend::ContentBackend;
use drafts::DraftStore;

/// Request-independent settings taken from the resolved config
#[derive(Debug, Clone)]
pub struct AdminSettings {
    pub session_cookie: String,
    pub auth_disabled: bool,
    pub page_size: i64,
}

impl From<&TomlConfig> for AdminSettings {
    fn from(config: &TomlConfig) -> Self {
        Self {
            session_cookie: config.session_cookie.clone(),
            auth_disabled: config.auth_disabled,
            page_size: config.page_size,
        }
    }
}

/// Resolve the effective configuration, logging through `subscriber`
///
/// Config loading runs before the configured subscriber can be built, so
/// its warnings (missing file, defaults in use) go to this one instead.
pub fn resolve_config<S>(
    subscriber: S,
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> cms_common::Result<TomlConfig>
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::with_default(subscriber, || config::resolve(config_path, overrides))
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ContentBackend>,
    pub content: Arc<ContentStore>,
    pub bus: EventBus,
    pub drafts: DraftStore,
    pub settings: Arc<AdminSettings>,
}

impl AppState {
    /// Create new application state with empty stores
    pub fn new(backend: Arc<dyn ContentBackend>, drafts: DraftStore, settings: AdminSettings) -> Self {
        let bus = EventBus::default();
        Self {
            backend,
            content: Arc::new(ContentStore::new(bus.clone())),
            bus,
            drafts,
            settings: Arc::new(settings),
        }
    }
}

/// Build application router
///
/// Everything except `/health`, `/sign-in` and static assets sits behind the
/// session gate.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use tower_http::trace::TraceLayer;

    let protected = Router::new()
        .merge(api::entity_api_routes())
        .merge(api::journey_routes())
        .merge(api::upload_routes())
        .merge(api::draft_routes())
        .route("/api/events", axum::routing::get(api::event_stream))
        .route("/api/buildinfo", axum::routing::get(api::get_build_info))
        .merge(api::page_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::session_middleware,
        ));

    let public = Router::new()
        .route("/sign-in", axum::routing::get(api::serve_index))
        .route("/static/app.js", axum::routing::get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
