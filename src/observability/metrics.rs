//! Metrics collection and exposition.
//!
//! # Metrics
//! - `vanity_requests_total` (counter): requests by method, status, page
//! - `vanity_request_duration_seconds` (histogram): handler latency
//!
//! Without an installed recorder the macros are no-ops.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one handled request.
pub fn record_request(method: &Method, status: u16, page: &'static str, start: Instant) {
    let method = method_label(method);
    let status = status.to_string();

    ::metrics::counter!(
        "vanity_requests_total",
        "method" => method,
        "status" => status.clone(),
        "page" => page
    )
    .increment(1);
    ::metrics::histogram!(
        "vanity_request_duration_seconds",
        "method" => method,
        "status" => status,
        "page" => page
    )
    .record(start.elapsed().as_secs_f64());
}

/// Label for a request method. Extension methods share one label so
/// clients cannot grow the series set.
fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::HEAD => "HEAD",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::CONNECT => "CONNECT",
        Method::OPTIONS => "OPTIONS",
        Method::TRACE => "TRACE",
        Method::PATCH => "PATCH",
        _ => "other",
    }
}
