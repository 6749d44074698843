//! Static assets referenced by the page layout.

use axum::{
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};

const BASE_CSS: &str = include_str!("static/base.css");
const FAVICON_SVG: &str = include_str!("static/favicon.svg");

const CACHE_CONTROL: &str = "public, max-age=86400";

/// Asset routes, ready to be merged into a host router.
pub fn routes() -> Router {
    Router::new()
        .route("/static/base.css", get(base_css))
        .route("/favicon.svg", get(favicon))
}

async fn base_css() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        BASE_CSS,
    )
}

async fn favicon() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        FAVICON_SVG,
    )
}
