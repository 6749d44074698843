//! Request metadata captured for logging.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderName, Request};

/// Header set by the request-id layer.
pub const X_REQUEST_ID: &str = "x-request-id";

/// The request fields recorded for every served request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequestInfo {
    pub method: String,
    pub url: String,
    pub proto: String,
    pub user_agent: String,
    pub remote_address: String,
    pub referrer: String,
    pub x_forwarded_for: String,
    pub forwarded: String,
    pub request_id: String,
}

impl HttpRequestInfo {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let get = |name: HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };

        Self {
            method: request.method().to_string(),
            url: request.uri().to_string(),
            proto: format!("{:?}", request.version()),
            user_agent: get(header::USER_AGENT),
            remote_address: request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.to_string())
                .unwrap_or_default(),
            referrer: get(header::REFERER),
            x_forwarded_for: get(HeaderName::from_static("x-forwarded-for")),
            forwarded: get(header::FORWARDED),
            request_id: get(HeaderName::from_static(X_REQUEST_ID)),
        }
    }
}
