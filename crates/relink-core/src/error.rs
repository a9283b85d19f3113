use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid CDN base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("CDN base URL must be http(s) with a host: {0}")]
    UnsupportedBaseUrl(String),
    #[error("at least one content kind is required")]
    NoContentKinds,
    #[error("Invalid content kind: {0:?}")]
    InvalidContentKind(String),
    #[error("Invalid version token: {0:?}")]
    InvalidToken(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
