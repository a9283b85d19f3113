#![forbid(unsafe_code)]

//! Probe machinery: a TTL cache of existence checks and a bounded scheduler
//! that runs them against the CDN.

mod cache;
mod scheduler;

pub use cache::{DEFAULT_CACHE_TTL, ProbeCache, ProbeCacheEntry};
pub use scheduler::{
    DEFAULT_MAX_PARALLEL, DEFAULT_PROBE_TIMEOUT, ProbeMethod, ProbeOptions, ProbeScheduler,
};
