//! Bounded, FIFO-fair execution of existence probes.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use relink_events::{EventBus, ProbeEvent};
use relink_net::{Net, NetError, RangeSpec, TimeoutNet};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, oneshot};
use tracing::{debug, trace, warn};
use url::Url;

/// Default cap on concurrently running probes.
pub const DEFAULT_MAX_PARALLEL: usize = 8;
/// Default per-probe deadline.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(4);

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// How a probe asks the CDN whether an object exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProbeMethod {
    /// `HEAD`; any 2xx means the object exists.
    #[default]
    Head,
    /// `GET` with `Range: bytes=0-0`, for origins that reject `HEAD`.
    RangeGet,
}

#[derive(Clone, Debug)]
pub struct ProbeOptions {
    pub max_parallel: usize,
    pub timeout: Duration,
    pub method: ProbeMethod,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            max_parallel: DEFAULT_MAX_PARALLEL,
            timeout: DEFAULT_PROBE_TIMEOUT,
            method: ProbeMethod::Head,
        }
    }
}

impl ProbeOptions {
    #[must_use]
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: ProbeMethod) -> Self {
        self.method = method;
        self
    }
}

struct Shared<N> {
    net: TimeoutNet<N>,
    slots: Arc<Semaphore>,
    max_parallel: usize,
    method: ProbeMethod,
    queued: AtomicUsize,
    in_flight: AtomicUsize,
    events: EventBus,
}

/// Runs probes with at most `max_parallel` in flight; the rest wait in
/// submission order.
///
/// Cheap to clone; clones share slots and counters.
pub struct ProbeScheduler<N> {
    shared: Arc<Shared<N>>,
}

impl<N> Clone for ProbeScheduler<N> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<N: Net + 'static> ProbeScheduler<N> {
    pub fn new(net: N, options: ProbeOptions) -> Self {
        Self::with_events(net, options, EventBus::new(DEFAULT_EVENT_CAPACITY))
    }

    /// Scheduler publishing [`ProbeEvent`]s to `events`.
    pub fn with_events(net: N, options: ProbeOptions, events: EventBus) -> Self {
        let max_parallel = options.max_parallel.max(1);
        Self {
            shared: Arc::new(Shared {
                net: TimeoutNet::new(net, options.timeout),
                slots: Arc::new(Semaphore::new(max_parallel)),
                max_parallel,
                method: options.method,
                queued: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                events,
            }),
        }
    }

    /// Whether `url` exists on the CDN.
    ///
    /// Waits for a free slot, then probes within the configured timeout.
    /// Only a 2xx answer yields `true`; timeouts and transport failures are
    /// `false`. The slot is released before this returns.
    ///
    /// Dropping the future while it waits for a slot withdraws the probe.
    /// Once started, a probe runs to completion and still fills its slot
    /// until then, even if nobody awaits the answer.
    pub async fn probe(&self, url: Url) -> bool {
        let shared = &self.shared;

        let waiting = Queued::enter(shared);
        trace!(%url, queued = waiting.depth, "probe queued");
        shared.events.publish(ProbeEvent::Queued {
            url: url.clone(),
            queued: waiting.depth,
        });

        let permit = match Arc::clone(&shared.slots).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                warn!(%url, "probe slots closed");
                return false;
            }
        };
        let in_flight = shared.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        drop(waiting);

        let (reply, answer) = oneshot::channel();
        let job = ProbeJob {
            url,
            permit,
            in_flight,
            reply,
            shared: Arc::clone(shared),
        };
        tokio::spawn(job.run());

        answer.await.unwrap_or(false)
    }

    pub fn timeout(&self) -> Duration {
        self.shared.net.timeout()
    }

    pub fn net(&self) -> &N {
        self.shared.net.inner()
    }
}

impl<N> ProbeScheduler<N> {
    /// Probes currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.load(Ordering::Acquire)
    }

    /// Probes waiting for a slot.
    pub fn queued(&self) -> usize {
        self.shared.queued.load(Ordering::Acquire)
    }

    pub fn max_parallel(&self) -> usize {
        self.shared.max_parallel
    }

    pub fn method(&self) -> ProbeMethod {
        self.shared.method
    }

    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }
}

/// Queue-depth accounting that survives cancellation of the waiting caller.
struct Queued<'a> {
    counter: &'a AtomicUsize,
    depth: usize,
}

impl<'a> Queued<'a> {
    fn enter<N>(shared: &'a Shared<N>) -> Self {
        let depth = shared.queued.fetch_add(1, Ordering::AcqRel) + 1;
        Self {
            counter: &shared.queued,
            depth,
        }
    }
}

impl Drop for Queued<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

/// One admitted probe: owns its slot until the request settles.
struct ProbeJob<N> {
    url: Url,
    permit: OwnedSemaphorePermit,
    in_flight: usize,
    reply: oneshot::Sender<bool>,
    shared: Arc<Shared<N>>,
}

impl<N: Net + 'static> ProbeJob<N> {
    async fn run(self) {
        let Self {
            url,
            permit,
            in_flight,
            reply,
            shared,
        } = self;

        debug_assert!(in_flight <= shared.max_parallel, "probe slots oversubscribed");
        shared.events.publish(ProbeEvent::Started {
            url: url.clone(),
            in_flight,
        });

        let started = Instant::now();
        let result = match shared.method {
            ProbeMethod::Head => shared.net.head(url.clone(), None).await.map(drop),
            ProbeMethod::RangeGet => shared
                .net
                .get_range(url.clone(), RangeSpec::first_byte(), None)
                .await
                .map(drop),
        };
        let elapsed = started.elapsed();
        let ok = outcome(&url, result);

        shared.in_flight.fetch_sub(1, Ordering::AcqRel);
        drop(permit);

        debug!(%url, ok, ?elapsed, "probe completed");
        shared.events.publish(ProbeEvent::Completed {
            url,
            ok,
            elapsed,
        });
        // Receiver gone means the caller stopped waiting.
        let _ = reply.send(ok);
    }
}

fn outcome(url: &Url, result: Result<(), NetError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) if e.is_absent() => {
            trace!(%url, "probe: object absent");
            false
        }
        Err(e) if e.is_timeout() => {
            debug!(%url, "probe timed out");
            false
        }
        Err(e) => {
            debug!(%url, error = %e, "probe failed");
            false
        }
    }
}
