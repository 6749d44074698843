//! Per-request observability records.
//!
//! The handler produces exactly one [`ServeEvent`] per request and hands it
//! to an [`Observer`]. The default observer writes it as a tracing event;
//! hosts and tests can plug in their own.

use axum::http::StatusCode;
use tracing::Level;

use crate::http::request::HttpRequestInfo;

/// Receives one record per handled request.
pub trait Observer: Send + Sync {
    fn observe(&self, event: &ServeEvent);
}

/// Outcome of one request.
#[derive(Debug, Clone)]
pub struct ServeEvent {
    pub level: Level,
    pub message: &'static str,
    pub status: StatusCode,
    pub request: HttpRequestInfo,
    /// Resolved repository, for repository pages only.
    pub repo: Option<String>,
    /// Error detail, never sent to the client.
    pub error: Option<String>,
}

/// Writes events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

macro_rules! emit {
    ($macro:ident, $event:expr) => {{
        let event = $event;
        let req = &event.request;
        tracing::$macro!(
            http_request.method = %req.method,
            http_request.url = %req.url,
            http_request.proto = %req.proto,
            http_request.user_agent = %req.user_agent,
            http_request.remote_address = %req.remote_address,
            http_request.referrer = %req.referrer,
            http_request.x_forwarded_for = %req.x_forwarded_for,
            http_request.forwarded = %req.forwarded,
            http_request.request_id = %req.request_id,
            http_response.status = event.status.as_u16(),
            vanity.repo = event.repo.as_deref(),
            error = event.error.as_deref(),
            "{}",
            event.message
        )
    }};
}

impl Observer for TracingObserver {
    fn observe(&self, event: &ServeEvent) {
        if event.level == Level::ERROR {
            emit!(error, event);
        } else if event.level == Level::WARN {
            emit!(warn, event);
        } else {
            emit!(info, event);
        }
    }
}
