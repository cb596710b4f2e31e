//! HTTP API handlers for cms-admin

pub mod auth;
pub mod buildinfo;
pub mod drafts;
pub mod entities;
pub mod health;
pub mod journey;
pub mod sse;
pub mod ui;
pub mod uploads;

pub use auth::session_middleware;
pub use buildinfo::get_build_info;
pub use drafts::draft_routes;
pub use entities::entity_api_routes;
pub use health::health_routes;
pub use journey::journey_routes;
pub use sse::event_stream;
pub use ui::{page_routes, serve_app_js, serve_index};
pub use uploads::upload_routes;
