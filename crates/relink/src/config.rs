#![forbid(unsafe_code)]

//! Configuration for [`Resolver`](crate::Resolver).

use std::time::Duration;

use relink_core::{CoreError, DEFAULT_CONTENT_KINDS, DEFAULT_LEDGER_CAPACITY};
use relink_net::NetOptions;
use relink_probe::{
    DEFAULT_CACHE_TTL, DEFAULT_MAX_PARALLEL, DEFAULT_PROBE_TIMEOUT, ProbeMethod, ProbeOptions,
};
use url::Url;

use crate::error::{RelinkError, RelinkResult};

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Everything a [`Resolver`](crate::Resolver) needs, with production defaults.
///
/// # Example
///
/// ```ignore
/// use relink::ResolverConfig;
///
/// let config = ResolverConfig::new("https://res.cloudinary.com/acme/image/upload")?
///     .with_content_kinds(["editor", "imagens"])
///     .with_seed_version_tokens(["1712345678"]);
/// ```
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Fixed CDN account root every candidate is built under.
    pub cdn_base_url: Url,
    /// Historical subfolders to try, in priority order.
    pub content_kinds: Vec<String>,
    /// Global cap on concurrent outbound probes.
    pub max_parallel_probes: usize,
    /// Per-probe deadline; expiry counts as "does not exist".
    pub probe_timeout: Duration,
    /// How long a probe outcome (positive or negative) is trusted.
    pub cache_ttl: Duration,
    /// Number of version tokens the ledger remembers.
    pub max_ledger_size: usize,
    /// Known-good tokens loaded at startup, oldest first.
    pub seed_version_tokens: Vec<String>,
    pub probe_method: ProbeMethod,
    /// HTTP client settings (user agent, idle pool).
    pub net: NetOptions,
    /// Buffer size of the event broadcast channel.
    pub event_capacity: usize,
}

impl ResolverConfig {
    /// Config for the CDN rooted at `cdn_base_url`, all else defaulted.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidBaseUrl`] if the string is not a URL and
    /// [`CoreError::UnsupportedBaseUrl`] unless it is an http(s) URL with a
    /// host.
    pub fn new(cdn_base_url: impl AsRef<str>) -> RelinkResult<Self> {
        let raw = cdn_base_url.as_ref().trim();
        let url =
            Url::parse(raw).map_err(|e| CoreError::InvalidBaseUrl(format!("{raw}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https")
            || url.host_str().is_none()
            || url.cannot_be_a_base()
        {
            return Err(CoreError::UnsupportedBaseUrl(raw.to_string()).into());
        }

        Ok(Self {
            cdn_base_url: url,
            content_kinds: DEFAULT_CONTENT_KINDS
                .iter()
                .map(ToString::to_string)
                .collect(),
            max_parallel_probes: DEFAULT_MAX_PARALLEL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            max_ledger_size: DEFAULT_LEDGER_CAPACITY,
            seed_version_tokens: Vec::new(),
            probe_method: ProbeMethod::default(),
            net: NetOptions::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        })
    }

    #[must_use]
    pub fn with_content_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_max_parallel_probes(mut self, max: usize) -> Self {
        self.max_parallel_probes = max;
        self
    }

    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_max_ledger_size(mut self, size: usize) -> Self {
        self.max_ledger_size = size;
        self
    }

    #[must_use]
    pub fn with_seed_version_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_version_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Use ranged `GET` instead of `HEAD` for CDNs that reject `HEAD`.
    #[must_use]
    pub fn with_probe_method(mut self, method: ProbeMethod) -> Self {
        self.probe_method = method;
        self
    }

    #[must_use]
    pub fn with_net(mut self, net: NetOptions) -> Self {
        self.net = net;
        self
    }

    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Check the numeric options.
    ///
    /// Content kinds and seed tokens are checked when the resolver parses
    /// them.
    ///
    /// # Errors
    ///
    /// [`RelinkError::InvalidConfig`] naming the first offending option.
    pub fn validate(&self) -> RelinkResult<()> {
        if self.max_parallel_probes == 0 {
            return Err(invalid("max_parallel_probes must be at least 1"));
        }
        if self.max_ledger_size == 0 {
            return Err(invalid("max_ledger_size must be at least 1"));
        }
        if self.probe_timeout.is_zero() {
            return Err(invalid("probe_timeout must be non-zero"));
        }
        if self.cache_ttl.is_zero() {
            return Err(invalid("cache_ttl must be non-zero"));
        }
        if self.event_capacity == 0 {
            return Err(invalid("event_capacity must be at least 1"));
        }
        Ok(())
    }

    pub(crate) fn probe_options(&self) -> ProbeOptions {
        ProbeOptions::default()
            .with_max_parallel(self.max_parallel_probes)
            .with_timeout(self.probe_timeout)
            .with_method(self.probe_method)
    }

    /// Client options with the request deadline aligned to the probe timeout.
    pub(crate) fn net_options(&self) -> NetOptions {
        self.net.clone().with_request_timeout(self.probe_timeout)
    }
}

fn invalid(msg: &str) -> RelinkError {
    RelinkError::InvalidConfig(msg.to_string())
}
