//! Go vanity import path server.
//!
//! Serves `go-import` / `go-source` meta tags for a module namespace, wrapped
//! in a readable page for people who open the same URL in a browser.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (request id, trace, timeout)
//!                         │
//!                         ▼
//!                     http::vanity ──▶ routing (Index | Repository)
//!                         │
//!            ┌────────────┴─────────────┐
//!            ▼                          ▼
//!     http::index                 templates (repo body, head)
//!     (rendered at startup)             │
//!                                       ▼
//!                                 render (markdown → layout)
//!                         │
//!                         ▼
//!     ◀────────────── response + one observability record
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod render;
pub mod routing;
pub mod templates;

pub use config::ServiceConfig;
pub use http::{HttpServer, VanityServer};
pub use lifecycle::Shutdown;
