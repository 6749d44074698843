//! The pre-rendered index page.

use std::ops::Range;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, Response, StatusCode};

use crate::config::VanityConfig;
use crate::render::{PageEnvelope, PageRenderer};
use crate::templates::{SiteContext, TemplateSet};

/// Index page bytes, rendered once at startup.
#[derive(Debug, Clone)]
pub struct RenderedIndex {
    bytes: Bytes,
    last_modified: SystemTime,
}

/// Error rendering the index page at startup.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error(transparent)]
    Template(#[from] crate::templates::TemplateError),
    #[error(transparent)]
    Layout(#[from] crate::render::LayoutError),
}

impl RenderedIndex {
    /// Render the index page, stamped with the current time.
    pub fn render(
        templates: &TemplateSet,
        renderer: &PageRenderer,
        config: &VanityConfig,
    ) -> Result<Self, IndexError> {
        let body = templates.render_index_body(&SiteContext {
            source: &config.source,
            host: &config.host,
        })?;
        let page = renderer.render(&PageEnvelope {
            head: String::new(),
            body,
        })?;
        Ok(Self::new(page, SystemTime::now()))
    }

    pub fn new(bytes: impl Into<Bytes>, last_modified: SystemTime) -> Self {
        Self {
            bytes: bytes.into(),
            last_modified,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Build the response.
    ///
    /// Preconditions are evaluated in the usual order: `If-Match`, then
    /// `If-Unmodified-Since`, then `If-None-Match` / `If-Modified-Since`.
    /// A single byte range is served as 206; no ETag is ever issued.
    pub fn respond(&self, headers: &HeaderMap) -> Result<Response<Body>, axum::http::Error> {
        let last_modified = httpdate::fmt_http_date(self.last_modified);

        if let Some(status) = self.check_preconditions(headers) {
            return Response::builder()
                .status(status)
                .header(header::LAST_MODIFIED, last_modified)
                .body(Body::empty());
        }

        let len = self.bytes.len();
        let builder = Response::builder()
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .header(header::LAST_MODIFIED, last_modified)
            .header(header::ACCEPT_RANGES, "bytes");

        match self.byte_range(headers) {
            ByteRange::Full => builder
                .status(StatusCode::OK)
                .body(Body::from(self.bytes.clone())),
            ByteRange::Partial(range) => builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", range.start, range.end - 1, len),
                )
                .body(Body::from(self.bytes.slice(range))),
            ByteRange::Unsatisfiable => Response::builder()
                .status(StatusCode::RANGE_NOT_SATISFIABLE)
                .header(header::CONTENT_RANGE, format!("bytes */{len}"))
                .body(Body::empty()),
        }
    }

    fn check_preconditions(&self, headers: &HeaderMap) -> Option<StatusCode> {
        let modified = truncate_to_secs(self.last_modified);

        // Without an ETag only the wildcard can match.
        if let Some(value) = header_str(headers, header::IF_MATCH) {
            if !has_wildcard(value) {
                return Some(StatusCode::PRECONDITION_FAILED);
            }
        } else if let Some(since) = header_date(headers, header::IF_UNMODIFIED_SINCE) {
            if modified > since {
                return Some(StatusCode::PRECONDITION_FAILED);
            }
        }

        match header_str(headers, header::IF_NONE_MATCH) {
            Some(value) if has_wildcard(value) => Some(StatusCode::NOT_MODIFIED),
            Some(_) => None,
            None => header_date(headers, header::IF_MODIFIED_SINCE)
                .filter(|since| modified <= *since)
                .map(|_| StatusCode::NOT_MODIFIED),
        }
    }

    fn byte_range(&self, headers: &HeaderMap) -> ByteRange {
        let Some(spec) = header_str(headers, header::RANGE) else {
            return ByteRange::Full;
        };
        // A validator that does not match means the client wants everything.
        if let Some(value) = header_str(headers, header::IF_RANGE) {
            let current = httpdate::parse_http_date(value)
                .is_ok_and(|date| date == truncate_to_secs(self.last_modified));
            if !current {
                return ByteRange::Full;
            }
        }
        parse_range(spec, self.bytes.len())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ByteRange {
    Full,
    Partial(Range<usize>),
    Unsatisfiable,
}

/// Parse a `Range` header against a body of `len` bytes.
///
/// Multiple ranges are answered with the full body.
fn parse_range(spec: &str, len: usize) -> ByteRange {
    let Some(set) = spec.trim().strip_prefix("bytes=") else {
        return ByteRange::Unsatisfiable;
    };
    let mut ranges = set.split(',').map(str::trim).filter(|r| !r.is_empty());
    let (Some(range), None) = (ranges.next(), ranges.next()) else {
        return ByteRange::Full;
    };
    let Some((first, last)) = range.split_once('-') else {
        return ByteRange::Unsatisfiable;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        return match last.parse::<usize>() {
            Ok(suffix) if suffix > 0 && len > 0 => {
                ByteRange::Partial(len - suffix.min(len)..len)
            }
            _ => ByteRange::Unsatisfiable,
        };
    }

    let start = match first.parse::<usize>() {
        Ok(start) if start < len => start,
        _ => return ByteRange::Unsatisfiable,
    };
    if last.is_empty() {
        return ByteRange::Partial(start..len);
    }
    match last.parse::<usize>() {
        Ok(end) if end >= start => ByteRange::Partial(start..end.saturating_add(1).min(len)),
        _ => ByteRange::Unsatisfiable,
    }
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).map(|v| v.to_str().unwrap_or_default())
}

fn header_date(headers: &HeaderMap, name: HeaderName) -> Option<SystemTime> {
    header_str(headers, name).and_then(|v| httpdate::parse_http_date(v).ok())
}

fn has_wildcard(value: &str) -> bool {
    value.split(',').any(|tag| tag.trim() == "*")
}

/// HTTP dates have second precision.
fn truncate_to_secs(time: SystemTime) -> SystemTime {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    UNIX_EPOCH + Duration::from_secs(secs)
}
