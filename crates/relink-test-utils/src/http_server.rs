//! Throwaway axum servers on loopback.

use std::net::SocketAddr;

use axum::Router;
use tokio::{net::TcpListener, sync::oneshot};
use url::Url;

/// Serves a router on `127.0.0.1:<random port>` until dropped.
pub struct TestHttpServer {
    addr: SocketAddr,
    base_url: Url,
    stop: Option<oneshot::Sender<()>>,
}

impl TestHttpServer {
    /// Bind and start serving `router`. The socket is listening on return.
    ///
    /// # Panics
    ///
    /// Panics if no loopback port can be bound.
    pub async fn new(router: Router) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .expect("bind loopback listener");
        let addr = listener.local_addr().expect("listener address");

        let (stop, stopped) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = stopped.await;
                })
                .await
                .expect("serve test router");
        });

        Self {
            addr,
            base_url: Url::parse(&format!("http://{addr}/")).expect("loopback URL"),
            stop: Some(stop),
        }
    }

    /// `path` resolved against the server root.
    ///
    /// # Panics
    ///
    /// Panics if `path` cannot be joined onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        self.base_url.join(path).expect("join test URL")
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for TestHttpServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}
