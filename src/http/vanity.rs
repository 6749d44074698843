//! The vanity page handler.
//!
//! # Request States
//! ```text
//! MethodCheck ──(not GET)──────────────────────────────▶ 405 ─┐
//!     │                                                       │
//! RouteDecision ──(Index)──▶ RenderedIndex (200 / 304) ───────┤
//!     │                                                       │
//!     └──(Repository)──▶ repo body → head → layout ──▶ 200 ───┤
//!                              └─────(any failure)───▶ 500 ───┤
//!                                                             ▼
//!                                              one ServeEvent, metrics
//! ```
//!
//! Pages are rendered fully into memory before a response is built, so a
//! failure at any stage can still turn into a clean 500.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use percent_encoding::percent_decode_str;
use tracing::Level;

use crate::config::VanityConfig;
use crate::http::index::RenderedIndex;
use crate::http::request::HttpRequestInfo;
use crate::http::response::ServeError;
use crate::observability::{metrics, Observer, ServeEvent};
use crate::render::{PageEnvelope, PageRenderer};
use crate::routing::Route;
use crate::templates::{PageRequest, TemplateSet};

/// Serves the index and per-repository pages.
pub struct VanityServer {
    config: VanityConfig,
    templates: TemplateSet,
    renderer: PageRenderer,
    index: RenderedIndex,
    observer: Arc<dyn Observer>,
}

impl VanityServer {
    pub fn new(
        config: VanityConfig,
        templates: TemplateSet,
        renderer: PageRenderer,
        index: RenderedIndex,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            config,
            templates,
            renderer,
            index,
            observer,
        }
    }

    #[cfg(test)]
    pub(crate) fn config(&self) -> &VanityConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> &RenderedIndex {
        &self.index
    }

    /// Routes handled by this server, ready to be merged into a host router.
    pub fn routes(self: Arc<Self>) -> Router {
        Router::new()
            .route("/", any(serve_vanity))
            .route("/{*path}", any(serve_vanity))
            .with_state(self)
    }

    /// Handle one request and record its outcome.
    pub fn handle<B>(&self, request: &Request<B>) -> Response {
        let start = Instant::now();
        let info = HttpRequestInfo::from_request(request);

        let path = percent_decode_str(request.uri().path()).decode_utf8_lossy();
        let (route, result) = if request.method() == Method::GET {
            let route = Route::from_path(&path);
            (Some(route), self.respond(route, request.headers()))
        } else {
            (None, Err(ServeError::MethodNotAllowed))
        };
        let repo = route.and_then(|route| route.repo());

        let (response, level, message, error) = match result {
            Ok(response) => {
                let message = if repo.is_some() {
                    "served module page"
                } else {
                    "served index page"
                };
                (response, Level::INFO, message, None)
            }
            Err(err) => {
                let detail = err.to_string();
                let (level, message) = (err.level(), err.public_message());
                (err.into_response(), level, message, Some(detail))
            }
        };

        metrics::record_request(
            request.method(),
            response.status().as_u16(),
            route.map_or("none", |route| route.page()),
            start,
        );
        self.observer.observe(&ServeEvent {
            level,
            message,
            status: response.status(),
            request: info,
            repo: repo.map(str::to_string),
            error,
        });

        response
    }

    fn respond(&self, route: Route<'_>, headers: &HeaderMap) -> Result<Response, ServeError> {
        match route {
            Route::Index => Ok(self.index.respond(headers)?),
            Route::Repository(repo) => {
                tracing::Span::current().record("repo", repo);
                self.render_module(repo)
            }
        }
    }

    /// Render a repository page.
    fn render_module(&self, repo: &str) -> Result<Response, ServeError> {
        let page = PageRequest::new(repo, &self.config.source, &self.config.host);

        let body = self.templates.render_repo_body(&page)?;
        let head = self.templates.render_head(&page)?;
        let html = self.renderer.render(&PageEnvelope { head, body })?;

        Ok(Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .body(Body::from(html))?)
    }
}

#[tracing::instrument(
    name = "serve vanity",
    skip_all,
    fields(method = %request.method(), path = %request.uri().path(), repo = tracing::field::Empty)
)]
async fn serve_vanity(State(vanity): State<Arc<VanityServer>>, request: Request) -> Response {
    vanity.handle(&request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateSources;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<ServeEvent>>,
    }

    impl Observer for RecordingObserver {
        fn observe(&self, event: &ServeEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    impl RecordingObserver {
        fn take(&self) -> Vec<ServeEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    fn server_with(
        sources: TemplateSources,
        layout: Option<&'static str>,
    ) -> (Router, Arc<RecordingObserver>) {
        let config = VanityConfig::default();
        let templates = TemplateSet::compile(sources).unwrap();
        let index_renderer = PageRenderer::new(&config.host).unwrap();
        let index = RenderedIndex::render(&templates, &index_renderer, &config).unwrap();
        let renderer = match layout {
            Some(layout) => PageRenderer::with_layout(&config.host, layout).unwrap(),
            None => index_renderer,
        };
        let observer = Arc::new(RecordingObserver::default());
        let server = VanityServer::new(config, templates, renderer, index, observer.clone());
        (Arc::new(server).routes(), observer)
    }

    fn server() -> (Router, Arc<RecordingObserver>) {
        server_with(TemplateSources::default(), None)
    }

    async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
        let request = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_module_page() {
        let (app, observer) = server();

        let (status, body) = send(&app, Method::GET, "/foo-bar").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("go.seankhliao.com/foo-bar git https://github.com/seankhliao/foo-bar"));
        assert!(body.contains("https://github.com/seankhliao/foo-bar/blob/master{/dir}/{file}#L{line}"));
        assert!(body.contains("<title>foo-bar</title>"));

        let events = observer.take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::INFO);
        assert_eq!(events[0].message, "served module page");
        assert_eq!(events[0].repo.as_deref(), Some("foo-bar"));
        assert_eq!(events[0].request.url, "/foo-bar");
    }

    #[tokio::test]
    async fn test_only_first_segment_used() {
        let (app, observer) = server();

        let (status, body) = send(&app, Method::GET, "/foo-bar/sub/path").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("go.seankhliao.com/foo-bar git https://github.com/seankhliao/foo-bar\""));
        assert!(!body.contains("sub/path"));
        assert_eq!(observer.take()[0].repo.as_deref(), Some("foo-bar"));
    }

    #[tokio::test]
    async fn test_index_is_stable() {
        let (app, observer) = server();

        let (status, first) = send(&app, Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        let (_, second) = send(&app, Method::GET, "/").await;
        assert_eq!(first, second);
        assert_eq!(first.matches("<!doctype html>").count(), 1);

        let events = observer.take();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.message == "served index page" && e.repo.is_none()));
    }

    #[tokio::test]
    async fn test_index_not_modified() {
        let (app, _) = server();

        let request = axum::http::Request::builder()
            .uri("/")
            .header(
                header::IF_MODIFIED_SINCE,
                httpdate::fmt_http_date(std::time::SystemTime::now() + std::time::Duration::from_secs(5)),
            )
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let (app, observer) = server();

        for (method, uri) in [
            (Method::POST, "/"),
            (Method::PUT, "/foo-bar"),
            (Method::HEAD, "/foo-bar"),
            (Method::DELETE, "/foo-bar/sub"),
        ] {
            let (status, body) = send(&app, method, uri).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert!(!body.contains("<html"));
        }

        let events = observer.take();
        assert_eq!(events.len(), 4);
        for event in events {
            assert_eq!(event.level, Level::WARN);
            assert_eq!(event.message, "GET only");
            assert_eq!(event.repo, None);
        }
    }

    #[tokio::test]
    async fn test_repo_is_escaped() {
        let (app, _) = server();

        let (status, body) = send(&app, Method::GET, "/%3Cscript%3Ealert(1)%3C%2Fscript%3E").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;alert(1)&lt;"));

        let (status, body) = send(&app, Method::GET, "/%22onload=%22x").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains(r#"content="go.seankhliao.com/"onload"#));
        assert!(body.contains(r#"content="go.seankhliao.com/&quot;onload=&quot;x git"#));
    }

    #[tokio::test]
    async fn test_markdown_in_repo_is_inert() {
        let (app, _) = server();

        let (status, body) = send(&app, Method::GET, "/%5Bx%5D(javascript:alert(1))").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains(r#"<a href="javascript:"#));
        assert!(body.contains("<h1>[x](javascript:alert(1))</h1>"));
        assert!(body.contains("<td>go.seankhliao.com/[x](javascript:alert(1))</td>"));

        let (status, body) = send(&app, Method::GET, "/!%5Bi%5D(x.png)").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("<img"));
        assert!(body.contains("<h1>![i](x.png)</h1>"));

        let (status, body) = send(&app, Method::GET, "/a%7Cb").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>a|b</h1>"));
        assert!(body.contains("<td>go.seankhliao.com/a|b</td>"));
    }

    #[tokio::test]
    async fn test_template_failure() {
        let (app, observer) = server_with(
            TemplateSources {
                repo: "# {{ repo }} {{ not_provided }}",
                ..TemplateSources::default()
            },
            None,
        );

        let (status, body) = send(&app, Method::GET, "/foo-bar").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "render repo");

        let events = observer.take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::ERROR);
        assert_eq!(events[0].status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(events[0].error.as_deref().unwrap().contains("repo.md"));
    }

    #[tokio::test]
    async fn test_head_failure() {
        let (app, observer) = server_with(
            TemplateSources {
                head: "{{ not_provided }}",
                ..TemplateSources::default()
            },
            None,
        );

        let (status, body) = send(&app, Method::GET, "/foo-bar").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "render head");
        assert_eq!(observer.take().len(), 1);
    }

    #[tokio::test]
    async fn test_layout_failure() {
        let (app, observer) = server_with(TemplateSources::default(), Some("{{ head|safe }}{{ nope }}"));

        let (status, body) = send(&app, Method::GET, "/foo-bar").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "render html");
        assert!(!body.contains("go-import"));

        let events = observer.take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::ERROR);
        assert_eq!(events[0].repo.as_deref(), Some("foo-bar"));
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_isolated() {
        let (app, _) = server();

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move {
                    let repo = format!("repo-{i}");
                    let (status, body) = send(&app, Method::GET, &format!("/{repo}")).await;
                    (i, repo, status, body)
                })
            })
            .collect();

        for task in tasks {
            let (i, repo, status, body) = task.await.unwrap();
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains(&format!("go.seankhliao.com/{repo} git https://github.com/seankhliao/{repo}\"")));
            for other in (0..32).filter(|&j| j != i) {
                assert!(!body.contains(&format!("seankhliao.com/repo-{other}\"")));
            }
        }
    }
}
