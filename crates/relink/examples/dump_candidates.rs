//! Example: print candidate lists as JSON without probing anything.
//!
//! Run with:
//! ```
//! cargo run -p relink --example dump_candidates -- <CDN_BASE_URL> <REFERENCE>...
//! ```

use std::{env, error::Error};

use relink::{Resolver, ResolverConfig};

const DUMP_LIMIT: usize = 50;

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut args = env::args().skip(1);
    let Some(cdn) = args.next() else {
        return Err("usage: dump_candidates <CDN_BASE_URL> <REFERENCE>...".into());
    };

    let seed: Vec<String> = env::var("RELINK_SEED")
        .map(|raw| raw.split(',').filter(|t| !t.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();
    let resolver = Resolver::new(ResolverConfig::new(&cdn)?.with_seed_version_tokens(seed))?;

    let dump = resolver.debug_candidates(args, DUMP_LIMIT);
    println!("{}", serde_json::to_string_pretty(&dump)?);
    Ok(())
}
