#![forbid(unsafe_code)]

use std::time::Duration;

use url::Url;

/// Events emitted by the probe scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeEvent {
    /// Probe submitted and waiting for a free slot.
    Queued { url: Url, queued: usize },
    /// Probe acquired a slot and its request is in flight.
    Started { url: Url, in_flight: usize },
    /// Probe finished. `ok` is false for non-2xx, timeouts and transport errors.
    Completed { url: Url, ok: bool, elapsed: Duration },
}
