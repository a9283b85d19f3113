#![forbid(unsafe_code)]

//! Probe-verified resolution of legacy image references.

use std::sync::Arc;

use futures::future::join_all;
use relink_core::{CandidateBuilder, CoreResult, LedgerInsert, VersionLedger, VersionToken};
use relink_events::{Event, EventBus, LedgerEvent, ResolveEvent};
use relink_net::{HttpClient, Net};
use relink_probe::{ProbeCache, ProbeScheduler};
use tokio::sync::broadcast;
use tracing::{debug, info, trace};
use url::Url;

use crate::{
    config::ResolverConfig,
    error::RelinkResult,
    resolution::{CandidateDump, Resolution, ResolverStats},
};

struct Inner<N> {
    builder: CandidateBuilder,
    ledger: VersionLedger,
    cache: ProbeCache,
    scheduler: ProbeScheduler<N>,
    events: EventBus,
}

/// Maps legacy image references to URLs that exist on the CDN.
///
/// One instance is meant to live for the whole process: its ledger, cache
/// and probe slots are shared by every clone and every concurrent call.
pub struct Resolver<N = HttpClient> {
    inner: Arc<Inner<N>>,
}

impl<N> Clone for Resolver<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Resolver<HttpClient> {
    /// Resolver probing over HTTP.
    ///
    /// # Errors
    ///
    /// Invalid configuration, content kinds or seed tokens, or an HTTP client
    /// that cannot be built.
    pub fn new(config: ResolverConfig) -> RelinkResult<Self> {
        let net = HttpClient::try_new(config.net_options())?;
        Self::with_net(config, net)
    }
}

impl<N: Net + 'static> Resolver<N> {
    /// Resolver probing through `net`.
    ///
    /// # Errors
    ///
    /// Invalid configuration, content kinds or seed tokens.
    pub fn with_net(config: ResolverConfig, net: N) -> RelinkResult<Self> {
        config.validate()?;

        let builder = CandidateBuilder::new(&config.cdn_base_url, &config.content_kinds)?;
        let seed = config
            .seed_version_tokens
            .iter()
            .map(VersionToken::new)
            .collect::<CoreResult<Vec<_>>>()?;
        let ledger = VersionLedger::with_seed(config.max_ledger_size, seed);
        let events = EventBus::new(config.event_capacity);
        let scheduler = ProbeScheduler::with_events(net, config.probe_options(), events.clone());

        info!(
            cdn = builder.cdn_base(),
            kinds = ?builder.content_kinds(),
            seeded = ledger.len(),
            max_parallel = scheduler.max_parallel(),
            "resolver ready"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                builder,
                ledger,
                cache: ProbeCache::new(config.cache_ttl),
                scheduler,
                events,
            }),
        })
    }

    /// First candidate for `reference` that exists on the CDN.
    ///
    /// Candidates are consulted strictly in priority order. Fresh cache
    /// entries short-circuit probing; every probe outcome is cached. A
    /// successful probe of a version-qualified URL teaches the ledger its
    /// token, so later lookups try that version first.
    pub async fn resolve(&self, reference: &str) -> Resolution {
        let inner = &self.inner;
        let candidates = self.candidates(reference);
        if candidates.is_empty() {
            trace!(reference, "not an image reference");
            return Resolution::NotFound;
        }

        let total = candidates.len();
        let mut probes = 0;
        for url in candidates {
            let ok = if let Some(ok) = inner.cache.get(&url) {
                trace!(%url, ok, "probe cache hit");
                inner.events.publish(ResolveEvent::CacheHit {
                    url: url.clone(),
                    ok,
                });
                ok
            } else {
                probes += 1;
                let ok = inner.scheduler.probe(url.clone()).await;
                inner.cache.put(url.clone(), ok);
                if ok {
                    self.learn(&url);
                }
                ok
            };

            if ok {
                debug!(reference, %url, probes, "resolved");
                inner.events.publish(ResolveEvent::Resolved {
                    reference: reference.to_string(),
                    url: url.clone(),
                    probes,
                });
                return Resolution::Found(url);
            }
        }

        debug!(reference, candidates = total, probes, "no candidate exists");
        inner.events.publish(ResolveEvent::NotFound {
            reference: reference.to_string(),
            candidates: total,
        });
        Resolution::NotFound
    }

    /// Resolve a batch concurrently; results follow input order.
    ///
    /// All lookups share the one probe budget.
    pub async fn resolve_many<I, S>(&self, references: I) -> Vec<Resolution>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let references: Vec<S> = references.into_iter().collect();
        join_all(references.iter().map(|r| self.resolve(r.as_ref()))).await
    }

    fn learn(&self, url: &Url) {
        let Some(token) = self.inner.builder.version_of(url) else {
            return;
        };
        if let LedgerInsert::Inserted { evicted } = self.inner.ledger.add(token.clone()) {
            info!(
                token = %token,
                evicted = evicted.as_ref().map(VersionToken::as_str),
                "learned version token"
            );
            self.inner.events.publish(LedgerEvent::TokenLearned {
                token: token.to_string(),
                evicted: evicted.map(|t| t.to_string()),
            });
        }
    }
}

impl<N> Resolver<N> {
    /// Zero-I/O guess: the highest-priority candidate, unverified.
    pub fn best_guess(&self, reference: &str) -> Option<Url> {
        self.candidates(reference).into_iter().next()
    }

    /// Candidate URLs in probe order under the current ledger. No probing.
    pub fn candidates(&self, reference: &str) -> Vec<Url> {
        self.inner
            .builder
            .build(reference, &self.inner.ledger.snapshot())
    }

    /// Candidate lists of the first `limit` references. No probing.
    pub fn debug_candidates<I, S>(&self, references: I, limit: usize) -> Vec<CandidateDump>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = self.inner.ledger.snapshot();
        references
            .into_iter()
            .take(limit)
            .map(|reference| {
                let reference = reference.as_ref();
                CandidateDump {
                    reference: reference.to_string(),
                    candidates: self
                        .inner
                        .builder
                        .build(reference, &tokens)
                        .into_iter()
                        .map(String::from)
                        .collect(),
                }
            })
            .collect()
    }

    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            ledger_tokens: self.inner.ledger.len(),
            cache_entries: self.inner.cache.len(),
            in_flight: self.inner.scheduler.in_flight(),
            queued: self.inner.scheduler.queued(),
        }
    }

    /// Subscribe to probe, ledger and resolve events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    pub fn ledger(&self) -> &VersionLedger {
        &self.inner.ledger
    }

    pub fn cache(&self) -> &ProbeCache {
        &self.inner.cache
    }

    pub fn scheduler(&self) -> &ProbeScheduler<N> {
        &self.inner.scheduler
    }

    pub fn candidate_builder(&self) -> &CandidateBuilder {
        &self.inner.builder
    }
}
