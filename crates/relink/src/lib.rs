#![forbid(unsafe_code)]

//! # Relink
//!
//! Resolves legacy image references (paths and URLs from an old CMS) to the
//! URL where the image now lives on a versioned CDN.
//!
//! ## Quick start
//!
//! ```ignore
//! use relink::prelude::*;
//!
//! let config = ResolverConfig::new("https://res.cloudinary.com/acme/image/upload")?;
//! let resolver = Resolver::new(config)?;
//!
//! match resolver.resolve("uploads/editor/foo.png").await {
//!     Resolution::Found(url) => println!("{url}"),
//!     Resolution::NotFound => println!("placeholder"),
//! }
//! ```

// ── Re-export sub-crates ────────────────────────────────────────────────

pub mod candidates {
    pub use relink_core::*;
}

pub mod events {
    pub use relink_events::*;
}

pub mod net {
    pub use relink_net::*;
}

pub mod probe {
    pub use relink_probe::*;
}

// ── Resolver ────────────────────────────────────────────────────────────

mod config;
mod error;
mod resolution;
mod resolver;

pub use config::ResolverConfig;
pub use error::{RelinkError, RelinkResult};
pub use resolution::{CandidateDump, Resolution, ResolverStats};
pub use resolver::Resolver;

// ── Prelude ─────────────────────────────────────────────────────────────

pub mod prelude {
    pub use relink_core::{CandidateBuilder, VersionLedger, VersionToken};
    pub use relink_events::{Event, LedgerEvent, ProbeEvent, ResolveEvent};
    pub use relink_net::{HttpClient, Net, NetOptions};
    pub use relink_probe::{ProbeCache, ProbeMethod, ProbeScheduler};

    pub use crate::{
        CandidateDump, RelinkError, RelinkResult, Resolution, Resolver, ResolverConfig,
        ResolverStats,
    };
}
