//! Error responses.
//!
//! # Design Decisions
//! - Clients get a short fixed message per failure stage
//! - Full error detail goes to the observability record only

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::Level;

use crate::render::LayoutError;
use crate::templates::{TemplateError, HEAD_TEMPLATE};

/// Everything that can go wrong while serving one request.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error(transparent)]
    TemplateRender(#[from] TemplateError),
    #[error(transparent)]
    LayoutRender(#[from] LayoutError),
    #[error("build response: {0}")]
    Write(#[from] axum::http::Error),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "GET only",
            Self::TemplateRender(e) if e.template() == HEAD_TEMPLATE => "render head",
            Self::TemplateRender(_) => "render repo",
            Self::LayoutRender(_) => "render html",
            Self::Write(_) => "write response",
        }
    }

    pub fn level(&self) -> Level {
        match self {
            Self::MethodNotAllowed => Level::WARN,
            _ => Level::ERROR,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}
