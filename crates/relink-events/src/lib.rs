#![forbid(unsafe_code)]

//! Unified event bus for the relink pipeline.

mod bus;
mod event;
mod ledger;
mod probe;
mod resolve;

pub use bus::EventBus;
pub use event::Event;
pub use ledger::LedgerEvent;
pub use probe::ProbeEvent;
pub use resolve::ResolveEvent;
