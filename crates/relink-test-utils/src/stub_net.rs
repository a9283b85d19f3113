//! Scripted in-memory [`Net`] for scheduler and resolver tests.

use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use parking_lot::Mutex;
use relink_net::{ByteStream, Headers, Net, NetError, RangeSpec};
use tokio::sync::Semaphore;
use url::Url;

/// Which transport call a probe made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StubCall {
    Head,
    Range,
}

/// Cloneable fake transport.
///
/// URLs registered with [`StubNet::with_existing`] answer successfully, all
/// others fail with a 404. Calls are recorded in order and concurrency is
/// tracked, optionally holding each call on a gate until released.
#[derive(Clone, Default)]
pub struct StubNet {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    existing: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    calls: Mutex<Vec<(StubCall, Url)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    started: AtomicUsize,
    completed: AtomicUsize,
}

struct InFlight<'a>(&'a Inner);

impl<'a> InFlight<'a> {
    fn enter(inner: &'a Inner) -> Self {
        inner.started.fetch_add(1, Ordering::SeqCst);
        let now = inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        inner.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(inner)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl StubNet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark URLs as existing.
    ///
    /// # Panics
    ///
    /// Panics if a URL does not parse.
    #[must_use]
    pub fn with_existing<I, S>(self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            self.add_existing(&Url::parse(url.as_ref()).expect("stub URL"));
        }
        self
    }

    /// Every call sleeps this long before answering.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.inner.delay.lock() = Some(delay);
        self
    }

    /// Every call blocks until let through by [`StubNet::release`].
    #[must_use]
    pub fn gated(self) -> Self {
        *self.inner.gate.lock() = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn add_existing(&self, url: &Url) {
        self.inner
            .existing
            .lock()
            .insert(url.as_str().to_string());
    }

    /// Let `n` gated calls through.
    pub fn release(&self, n: usize) {
        if let Some(gate) = self.inner.gate.lock().as_ref() {
            gate.add_permits(n);
        }
    }

    /// Open the gate for good.
    pub fn release_all(&self) {
        if let Some(gate) = self.inner.gate.lock().as_ref() {
            gate.close();
        }
    }

    /// URLs called, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<Url> {
        self.inner
            .calls
            .lock()
            .iter()
            .map(|(_, url)| url.clone())
            .collect()
    }

    #[must_use]
    pub fn calls_of(&self, kind: StubCall) -> usize {
        self.inner
            .calls
            .lock()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.calls.lock().len()
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn started(&self) -> usize {
        self.inner.started.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.inner.completed.load(Ordering::SeqCst)
    }

    async fn answer(&self, kind: StubCall, url: &Url) -> Result<(), NetError> {
        self.inner
            .calls
            .lock()
            .push((kind, url.clone()));
        let _in_flight = InFlight::enter(&self.inner);

        let gate = self.inner.gate.lock().clone();
        if let Some(gate) = gate {
            // A closed gate lets everything through.
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let delay = *self.inner.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.inner.completed.fetch_add(1, Ordering::SeqCst);
        if self.inner.existing.lock().contains(url.as_str()) {
            Ok(())
        } else {
            Err(NetError::http_error(404, url.clone(), None))
        }
    }
}

#[async_trait]
impl Net for StubNet {
    async fn head(&self, url: Url, _headers: Option<Headers>) -> Result<Headers, NetError> {
        self.answer(StubCall::Head, &url).await?;
        let mut headers = Headers::new();
        headers.insert("content-type", "image/png");
        Ok(headers)
    }

    async fn get_range(
        &self,
        url: Url,
        _range: RangeSpec,
        _headers: Option<Headers>,
    ) -> Result<ByteStream, NetError> {
        self.answer(StubCall::Range, &url).await?;
        let first: Result<Bytes, NetError> = Ok(Bytes::from_static(b"\x89"));
        Ok(Box::pin(stream::once(async move { first })))
    }
}
