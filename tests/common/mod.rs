//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use vanity::config::ServiceConfig;
use vanity::http::{HttpServer, RenderedIndex, VanityServer};
use vanity::lifecycle::Shutdown;
use vanity::observability::{Observer, ServeEvent};
use vanity::render::PageRenderer;
use vanity::templates::{TemplateSet, TemplateSources};

/// Keeps every event it is handed.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ServeEvent>>,
}

impl Observer for RecordingObserver {
    fn observe(&self, event: &ServeEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

impl RecordingObserver {
    #[allow(dead_code)]
    pub fn events(&self) -> Vec<ServeEvent> {
        self.events.lock().unwrap().clone()
    }
}

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub observer: Arc<RecordingObserver>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server with the built-in templates.
#[allow(dead_code)]
pub async fn start_server(config: ServiceConfig) -> TestServer {
    start_server_with(config, TemplateSources::default(), None).await
}

/// Start a server with custom template sources and, optionally, layout.
pub async fn start_server_with(
    config: ServiceConfig,
    sources: TemplateSources,
    layout: Option<&'static str>,
) -> TestServer {
    let templates = TemplateSet::compile(sources).unwrap();
    let renderer = match layout {
        Some(layout) => PageRenderer::with_layout(&config.vanity.host, layout).unwrap(),
        None => PageRenderer::new(&config.vanity.host).unwrap(),
    };
    let index = RenderedIndex::new("<html>index</html>", std::time::SystemTime::now());
    let observer = Arc::new(RecordingObserver::default());
    let vanity = VanityServer::new(
        config.vanity.clone(),
        templates,
        renderer,
        index,
        observer.clone(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, Arc::new(vanity));
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    TestServer {
        addr,
        observer,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
