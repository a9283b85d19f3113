#![forbid(unsafe_code)]

use relink_core::CoreError;
use relink_net::NetError;
use thiserror::Error;

/// Errors raised while building a [`Resolver`](crate::Resolver).
///
/// Resolution itself never fails; see [`Resolution`](crate::Resolution).
#[derive(Debug, Error)]
pub enum RelinkError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Net(#[from] NetError),
    #[error("Invalid resolver configuration: {0}")]
    InvalidConfig(String),
}

pub type RelinkResult<T> = Result<T, RelinkError>;
