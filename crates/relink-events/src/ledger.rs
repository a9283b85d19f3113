#![forbid(unsafe_code)]

/// Events emitted when the version ledger changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// A new version token was learned from a successful probe.
    TokenLearned {
        token: String,
        evicted: Option<String>,
    },
}
