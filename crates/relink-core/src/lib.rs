//! Pure building blocks for relinking legacy image references to CDN URLs.
//!
//! Nothing here performs I/O. [`CandidateBuilder`] enumerates where an image
//! may live, [`VersionLedger`] remembers which version tokens have worked.

#![forbid(unsafe_code)]

mod candidates;
mod error;
mod ledger;
mod token;

pub use candidates::{
    CandidateBuilder, DEFAULT_CONTENT_KINDS, IMAGE_EXTENSIONS, file_name, is_image_reference,
    strip_query,
};
pub use error::{CoreError, CoreResult};
pub use ledger::{DEFAULT_LEDGER_CAPACITY, LedgerInsert, VersionLedger};
pub use token::VersionToken;
