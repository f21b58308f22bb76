#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;

use shortkey::application::services::{KeyAllocator, LinkService, StatsService};
use shortkey::domain::click_event::ClickEvent;
use shortkey::domain::entities::{Link, NewAlias};
use shortkey::domain::repositories::LinkRepository;
use shortkey::infrastructure::persistence::{MemoryClickRepository, MemoryLinkRepository};
use shortkey::rate_limit::{RateLimitConfig, RateLimiter};
use shortkey::routes::router;
use shortkey::state::AppState;

pub const BASE_URL: &str = "http://sho.rt";

/// A router backed by in-memory storage, plus handles on its internals.
pub struct TestApp {
    pub server: TestServer,
    pub links: MemoryLinkRepository,
    pub clicks: MemoryClickRepository,
    pub click_rx: mpsc::Receiver<ClickEvent>,
}

pub fn create_test_app() -> TestApp {
    create_test_app_with(RateLimitConfig::new(100, Duration::from_secs(60)), false)
}

pub fn create_test_app_with(rate_limit: RateLimitConfig, behind_proxy: bool) -> TestApp {
    let links = MemoryLinkRepository::new();
    let clicks = MemoryClickRepository::new();
    let (tx, rx) = mpsc::channel(100);

    let link_repo: Arc<dyn LinkRepository> = Arc::new(links.clone());
    let allocator = KeyAllocator::new(link_repo.clone(), 6, 10);
    let link_service = LinkService::new(link_repo, allocator, BASE_URL, Duration::from_secs(5));
    let stats_service = StatsService::new(Arc::new(clicks.clone()));

    let state = AppState::new(
        Arc::new(link_service),
        Arc::new(stats_service),
        Arc::new(RateLimiter::new(rate_limit)),
        tx,
        behind_proxy,
    );

    let app = router(state).layer(MockConnectInfoLayer);
    let server = TestServer::new(app).unwrap();

    TestApp {
        server,
        links,
        clicks,
        click_rx: rx,
    }
}

/// Stores a custom link directly, bypassing request validation.
pub async fn insert_alias(
    links: &MemoryLinkRepository,
    alias: &str,
    long_url: &str,
    expires_at: Option<DateTime<Utc>>,
) -> Link {
    links
        .insert_alias(NewAlias {
            alias: alias.to_string(),
            long_url: long_url.to_string(),
            expires_at,
        })
        .await
        .unwrap()
}

/// Gives every request the same peer address, as `into_make_service_with_connect_info` would.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
