#![forbid(unsafe_code)]

use serde::Serialize;
use url::Url;

/// Outcome of [`Resolver::resolve`](crate::Resolver::resolve).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// First candidate confirmed to exist on the CDN.
    Found(Url),
    /// Not an image reference, or no candidate exists. Callers usually
    /// substitute a placeholder.
    NotFound,
}

impl Resolution {
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Found(url) => Some(url),
            Self::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn into_url(self) -> Option<Url> {
        match self {
            Self::Found(url) => Some(url),
            Self::NotFound => None,
        }
    }

    /// Resolved URL or `fallback` (typically a placeholder asset).
    pub fn unwrap_or(self, fallback: Url) -> Url {
        self.into_url().unwrap_or(fallback)
    }
}

impl From<Resolution> for Option<Url> {
    fn from(resolution: Resolution) -> Self {
        resolution.into_url()
    }
}

/// Candidate list of one reference, for diagnostics endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CandidateDump {
    pub reference: String,
    pub candidates: Vec<String>,
}

/// Point-in-time view of the resolver's shared state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    pub ledger_tokens: usize,
    pub cache_entries: usize,
    pub in_flight: usize,
    pub queued: usize,
}
