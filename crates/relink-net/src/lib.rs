#![forbid(unsafe_code)]

//! HTTP transport used to check whether a candidate CDN object exists.
//!
//! The [`Net`] trait is the seam between the probe machinery and the wire:
//! [`HttpClient`] talks to a real CDN through reqwest, tests plug in scripted
//! implementations, and [`TimeoutNet`] bounds any of them in time.

mod client;
mod error;
mod timeout;
mod traits;
mod types;

pub use crate::{
    client::HttpClient,
    error::{NetError, NetResult},
    timeout::TimeoutNet,
    traits::{ByteStream, Net, NetExt},
    types::{Headers, NetOptions, RangeSpec},
};
