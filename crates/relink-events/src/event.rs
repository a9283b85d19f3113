#![forbid(unsafe_code)]

use crate::{LedgerEvent, ProbeEvent, ResolveEvent};

/// Unified event for the relink pipeline.
///
/// Hierarchical: each subsystem has its own variant with a sub-enum.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Probe scheduler event.
    Probe(ProbeEvent),
    /// Version ledger event.
    Ledger(LedgerEvent),
    /// Resolver event.
    Resolve(ResolveEvent),
}

impl From<ProbeEvent> for Event {
    fn from(e: ProbeEvent) -> Self {
        Self::Probe(e)
    }
}

impl From<LedgerEvent> for Event {
    fn from(e: LedgerEvent) -> Self {
        Self::Ledger(e)
    }
}

impl From<ResolveEvent> for Event {
    fn from(e: ResolveEvent) -> Self {
        Self::Resolve(e)
    }
}
