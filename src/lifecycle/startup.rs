//! Startup orchestration.
//!
//! Everything a request needs is built here, before the listener is bound.
//! A template that does not compile or an index that does not render stops
//! the process instead of failing requests later.

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::http::index::{IndexError, RenderedIndex};
use crate::http::VanityServer;
use crate::observability::Observer;
use crate::render::{LayoutError, PageRenderer};
use crate::templates::{TemplateError, TemplateSet};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("templates: {0}")]
    Templates(#[from] TemplateError),
    #[error("layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("render index page: {0}")]
    Index(#[from] IndexError),
}

/// Build the vanity server from the built-in templates.
pub fn prepare(config: &ServiceConfig, observer: Arc<dyn Observer>) -> Result<VanityServer, StartupError> {
    let templates = TemplateSet::builtin()?;
    let renderer = PageRenderer::new(&config.vanity.host)?;
    let index = RenderedIndex::render(&templates, &renderer, &config.vanity)?;

    tracing::info!(
        host = %config.vanity.host,
        source = %config.vanity.source,
        index_bytes = index.bytes().len(),
        "Templates compiled, index rendered"
    );

    Ok(VanityServer::new(
        config.vanity.clone(),
        templates,
        renderer,
        index,
        observer,
    ))
}
