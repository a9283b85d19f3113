#![forbid(unsafe_code)]

use url::Url;

/// Events emitted by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveEvent {
    /// Candidate answered from the probe cache.
    CacheHit { url: Url, ok: bool },
    /// Reference resolved after `probes` network probes.
    Resolved {
        reference: String,
        url: Url,
        probes: usize,
    },
    /// Every candidate was tried and none exists.
    NotFound {
        reference: String,
        candidates: usize,
    },
}
