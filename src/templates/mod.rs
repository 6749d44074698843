//! Template store.
//!
//! # Data Flow
//! ```text
//! embedded sources (index.md, repo.md, head.html)
//!     → TemplateSet::compile (once, at startup)
//!     → render_index_body   (once, at startup)
//!     → render_repo_body    (per repository request)
//!     → render_head         (per repository request)
//! ```
//!
//! # Design Decisions
//! - Compiled once and never mutated; shared across requests without locks
//! - Every template is auto-escaped: HTML for `.html`, markdown for `.md`
//! - Undefined values are errors rather than empty strings

mod escape;

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

pub use escape::{escape_html, escape_markdown};

pub const INDEX_TEMPLATE: &str = "index.md";
pub const REPO_TEMPLATE: &str = "repo.md";
pub const HEAD_TEMPLATE: &str = "head.html";

/// Values filled into the per-repository templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest<'a> {
    /// Repository name, the first path segment of the request.
    pub repo: &'a str,
    /// Source hosting base, e.g. `github.com/seankhliao`.
    pub source: &'a str,
    /// Host this server answers for, e.g. `go.seankhliao.com`.
    pub host: &'a str,
}

impl<'a> PageRequest<'a> {
    pub fn new(repo: &'a str, source: &'a str, host: &'a str) -> Self {
        Self { repo, source, host }
    }
}

/// Constant values available to the index template.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SiteContext<'a> {
    pub source: &'a str,
    pub host: &'a str,
}

/// Raw template sources.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSources {
    pub index: &'static str,
    pub repo: &'static str,
    pub head: &'static str,
}

impl Default for TemplateSources {
    fn default() -> Self {
        Self {
            index: include_str!("index.md"),
            repo: include_str!("repo.md"),
            head: include_str!("head.html"),
        }
    }
}

/// Error compiling or executing one of the templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("compile {template} template: {source}")]
    Compile {
        template: &'static str,
        #[source]
        source: minijinja::Error,
    },
    #[error("render {template} template: {source}")]
    Render {
        template: &'static str,
        #[source]
        source: minijinja::Error,
    },
}

impl TemplateError {
    /// Name of the template that failed.
    pub fn template(&self) -> &'static str {
        match self {
            Self::Compile { template, .. } | Self::Render { template, .. } => template,
        }
    }
}

/// The three compiled templates.
#[derive(Debug)]
pub struct TemplateSet {
    env: Environment<'static>,
}

impl TemplateSet {
    /// Compile the templates embedded in the binary.
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::compile(TemplateSources::default())
    }

    /// Compile the given sources.
    pub fn compile(sources: TemplateSources) -> Result<Self, TemplateError> {
        let mut env = environment();
        for (template, source) in [
            (INDEX_TEMPLATE, sources.index),
            (REPO_TEMPLATE, sources.repo),
            (HEAD_TEMPLATE, sources.head),
        ] {
            env.add_template(template, source)
                .map_err(|source| TemplateError::Compile { template, source })?;
        }
        Ok(Self { env })
    }

    pub fn render_index_body(&self, site: &SiteContext<'_>) -> Result<String, TemplateError> {
        self.render(INDEX_TEMPLATE, site)
    }

    pub fn render_repo_body(&self, page: &PageRequest<'_>) -> Result<String, TemplateError> {
        self.render(REPO_TEMPLATE, page)
    }

    /// Render the `go-import` / `go-source` meta tags.
    pub fn render_head(&self, page: &PageRequest<'_>) -> Result<String, TemplateError> {
        self.render(HEAD_TEMPLATE, page)
    }

    fn render<S: Serialize>(&self, template: &'static str, ctx: S) -> Result<String, TemplateError> {
        self.env
            .get_template(template)
            .and_then(|t| t.render(ctx))
            .map_err(|source| TemplateError::Render { template, source })
    }
}

/// Base environment shared by the template store and the page layout.
pub(crate) fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(escape::auto_escape);
    env.set_formatter(escape::formatter);
    env
}
