//! Console pages
//!
//! Every page route serves the same shell; `app.js` renders the view for
//! the current path.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../ui/index.html");
const APP_JS: &str = include_str!("../ui/app.js");

/// Page shell
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}

/// Page routes behind the session gate
pub fn page_routes() -> Router<AppState> {
    const PAGES: [&str; 15] = [
        "/",
        "/articles",
        "/articles/add",
        "/articles/edit/:id",
        "/videos",
        "/videos/add",
        "/sections",
        "/sub-sections",
        "/collections",
        "/journey/:journey_id/:section_id/:unit_id",
        "/quiz",
        "/tips",
        "/packs",
        "/conditions",
        "/medicines",
    ];
    PAGES
        .into_iter()
        .fold(Router::new(), |router, path| router.route(path, get(serve_index)))
}
