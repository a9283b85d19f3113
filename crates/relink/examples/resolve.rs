//! Example: resolve legacy image references against a live CDN.
//!
//! Run with:
//! ```
//! cargo run -p relink --example resolve -- <CDN_BASE_URL> <REFERENCE>...
//! ```
//!
//! `RELINK_SEED` may hold comma-separated version tokens to pre-load.

use std::{env, error::Error};

use relink::prelude::*;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, metadata::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::default()
                .add_directive("relink=debug".parse()?)
                .add_directive("relink_probe=debug".parse()?)
                .add_directive("relink_net=warn".parse()?)
                .add_directive(LevelFilter::INFO.into()),
        )
        .with_line_number(false)
        .with_file(false)
        .init();

    let mut args = env::args().skip(1);
    let Some(cdn) = args.next() else {
        return Err("usage: resolve <CDN_BASE_URL> <REFERENCE>...".into());
    };
    let references: Vec<String> = args.collect();

    let seed: Vec<String> = env::var("RELINK_SEED")
        .map(|raw| raw.split(',').filter(|t| !t.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();

    let config = ResolverConfig::new(&cdn)?.with_seed_version_tokens(seed);
    let resolver = Resolver::new(config)?;

    let mut events = resolver.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(Event::Ledger(ev)) => info!(?ev, "ledger"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event log lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let results = resolver.resolve_many(&references).await;
    for (reference, resolution) in references.iter().zip(results) {
        match resolution {
            Resolution::Found(url) => info!(%reference, %url, "found"),
            Resolution::NotFound => warn!(%reference, "not found"),
        }
    }

    info!(stats = ?resolver.stats(), "done");
    Ok(())
}
