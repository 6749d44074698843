//! Page layout rendering.
//!
//! Takes body markdown plus a head fragment and produces a complete HTML
//! document in the site's shared shell.

use minijinja::Environment;
use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::templates;

const LAYOUT_TEMPLATE: &str = "layout.html";

/// Body and head fragment for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageEnvelope {
    /// HTML injected into `<head>`.
    pub head: String,
    /// Markdown for the page body.
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("compile layout: {0}")]
    Compile(#[source] minijinja::Error),
    #[error("render layout: {0}")]
    Render(#[source] minijinja::Error),
}

#[derive(Serialize)]
struct LayoutContext<'a> {
    site: &'a str,
    title: &'a str,
    head: &'a str,
    body: &'a str,
}

/// Wraps rendered markdown in the shared layout.
#[derive(Debug)]
pub struct PageRenderer {
    site: String,
    env: Environment<'static>,
}

impl PageRenderer {
    /// Create a renderer using the built-in layout.
    pub fn new(site: impl Into<String>) -> Result<Self, LayoutError> {
        Self::with_layout(site, include_str!("layout.html"))
    }

    /// Create a renderer using a custom layout template.
    ///
    /// The layout receives `site`, `title`, `head` and `body`.
    pub fn with_layout(site: impl Into<String>, layout: &'static str) -> Result<Self, LayoutError> {
        let mut env = templates::environment();
        env.add_template(LAYOUT_TEMPLATE, layout)
            .map_err(LayoutError::Compile)?;
        Ok(Self {
            site: site.into(),
            env,
        })
    }

    /// Render a full HTML document.
    pub fn render(&self, page: &PageEnvelope) -> Result<String, LayoutError> {
        let (title, body) = markdown_to_html(&page.body);
        let title = title.unwrap_or_else(|| self.site.clone());

        self.env
            .get_template(LAYOUT_TEMPLATE)
            .and_then(|t| {
                t.render(LayoutContext {
                    site: &self.site,
                    title: &title,
                    head: &page.head,
                    body: &body,
                })
            })
            .map_err(LayoutError::Render)
    }
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

/// Convert markdown to HTML, returning the text of the first level-1 heading.
fn markdown_to_html(markdown: &str) -> (Option<String>, String) {
    let mut title: Option<String> = None;
    let mut in_title = false;

    let events: Vec<Event<'_>> = Parser::new_ext(markdown, parser_options())
        .inspect(|event| match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if title.is_none() => {
                in_title = true;
                title = Some(String::new());
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => in_title = false,
            Event::Text(text) | Event::Code(text) if in_title => {
                if let Some(title) = title.as_mut() {
                    title.push_str(text);
                }
            }
            _ => {}
        })
        .collect();

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    (title.filter(|t| !t.is_empty()), out)
}
