//! Fake image CDN serving a fixed set of object paths.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use url::Url;

use crate::TestHttpServer;

/// Path prefix the fake CDN mounts its objects under.
pub const CDN_PREFIX: &str = "/demo/image/upload";

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// Fake CDN: objects under [`CDN_PREFIX`] answer 200 (206 for ranged GETs),
/// everything else 404. Every request path is counted.
pub struct TestCdn {
    server: TestHttpServer,
    requests: Arc<Mutex<HashMap<String, usize>>>,
}

impl TestCdn {
    /// `objects` are paths relative to [`CDN_PREFIX`], e.g. `imagens/foo.png`
    /// or `v999/imagens/foo.png`.
    pub async fn start<I, S>(objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let objects: HashSet<String> = objects
            .into_iter()
            .map(|path| format!("{CDN_PREFIX}/{}", path.as_ref().trim_start_matches('/')))
            .collect();
        let requests = Arc::new(Mutex::new(HashMap::new()));
        let counts = Arc::clone(&requests);

        let app = Router::new()
            .fallback(serve_object)
            .with_state(Arc::new(objects))
            .layer(middleware::from_fn(move |req: Request, next: Next| {
                let counts = Arc::clone(&counts);
                async move {
                    let path = req.uri().path().to_string();
                    *counts.lock().entry(path).or_insert(0) += 1;
                    next.run(req).await
                }
            }));

        Self {
            server: TestHttpServer::new(app).await,
            requests,
        }
    }

    /// CDN base URL to configure a resolver with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "{}{CDN_PREFIX}",
            self.server.base_url().as_str().trim_end_matches('/')
        )
    }

    /// Absolute URL of an object path relative to [`CDN_PREFIX`].
    #[must_use]
    pub fn object_url(&self, path: &str) -> Url {
        self.server
            .url(&format!("{CDN_PREFIX}/{}", path.trim_start_matches('/')))
    }

    /// Requests seen for an object path relative to [`CDN_PREFIX`].
    #[must_use]
    pub fn request_count(&self, path: &str) -> usize {
        let key = format!("{CDN_PREFIX}/{}", path.trim_start_matches('/'));
        self.requests.lock().get(&key).copied().unwrap_or(0)
    }

    /// Total requests seen by the server.
    #[must_use]
    pub fn total_requests(&self) -> usize {
        self.requests.lock().values().sum()
    }
}

async fn serve_object(State(objects): State<Arc<HashSet<String>>>, req: Request) -> Response {
    if !objects.contains(req.uri().path()) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let method = req.method();
    if method == Method::GET && req.headers().contains_key(header::RANGE) {
        return Response::builder()
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_TYPE, "image/png")
            .header(
                header::CONTENT_RANGE,
                format!("bytes 0-0/{}", PNG_BYTES.len()),
            )
            .body(Body::from(&PNG_BYTES[..1]))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response());
    }
    if method == Method::GET || method == Method::HEAD {
        return ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES).into_response();
    }
    StatusCode::METHOD_NOT_ALLOWED.into_response()
}
