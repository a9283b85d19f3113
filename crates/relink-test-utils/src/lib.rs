#![forbid(unsafe_code)]

//! Shared test utilities for the relink workspace.

pub mod cdn;
pub mod http_server;
pub mod stub_net;

pub use cdn::{CDN_PREFIX, TestCdn};
pub use http_server::TestHttpServer;
pub use stub_net::{StubCall, StubNet};
