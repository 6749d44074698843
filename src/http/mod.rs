//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace and timeout layers)
//!     → vanity.rs (method check, route, render, one ServeEvent)
//!         → index.rs (cached index page, conditional GET)
//!         → response.rs (error kinds → status + fixed message)
//!     → assets.rs (stylesheet, icon)
//!     → Send to client
//! ```

pub mod assets;
pub mod index;
pub mod request;
pub mod response;
pub mod server;
pub mod vanity;

pub use index::RenderedIndex;
pub use request::{HttpRequestInfo, X_REQUEST_ID};
pub use response::ServeError;
pub use server::HttpServer;
pub use vanity::VanityServer;
