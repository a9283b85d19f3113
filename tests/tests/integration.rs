//! All integration tests for relink
#![expect(
    clippy::unwrap_used,
    reason = "integration test crate, unwraps are acceptable in test code"
)]

mod common;
mod concurrency;
mod events;
mod http_cdn;
mod scenarios;
