//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Vanity handler produces:
//!     → events.rs (one ServeEvent per request, handed to an Observer)
//!     → metrics.rs (request counter, latency histogram)
//!
//! Consumers:
//!     → logging.rs (tracing subscriber, pretty or JSON to stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Exactly one record per request, whatever the outcome
//! - Request ID flows from the request-id layer into every record
//! - Error details stay server side

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Observer, ServeEvent, TracingObserver};
