//! Bounded FIFO set of version tokens known to work on the CDN.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::token::VersionToken;

/// Default number of tokens the ledger remembers.
pub const DEFAULT_LEDGER_CAPACITY: usize = 8;

/// Outcome of [`VersionLedger::add`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerInsert {
    /// Token is new. `evicted` is the oldest token pushed out to make room.
    Inserted { evicted: Option<VersionToken> },
    /// Token was already known; order is untouched.
    AlreadyPresent,
}

impl LedgerInsert {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted { .. })
    }
}

/// Insertion-ordered, capacity-bounded token set.
///
/// Eviction is FIFO: re-adding a known token does not refresh it. All
/// operations take one short lock, so concurrent probe completions can learn
/// tokens without coordination.
#[derive(Debug)]
pub struct VersionLedger {
    capacity: usize,
    tokens: Mutex<VecDeque<VersionToken>>,
}

impl VersionLedger {
    /// A zero capacity is bumped to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            tokens: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Ledger pre-populated with `seed`, inserted in iteration order.
    ///
    /// A seed longer than `capacity` keeps only its last `capacity` tokens.
    #[must_use]
    pub fn with_seed<I>(capacity: usize, seed: I) -> Self
    where
        I: IntoIterator<Item = VersionToken>,
    {
        let ledger = Self::new(capacity);
        for token in seed {
            ledger.add(token);
        }
        ledger
    }

    pub fn add(&self, token: VersionToken) -> LedgerInsert {
        let mut tokens = self.tokens.lock();
        if tokens.contains(&token) {
            return LedgerInsert::AlreadyPresent;
        }

        let evicted = if tokens.len() >= self.capacity {
            tokens.pop_front()
        } else {
            None
        };
        tokens.push_back(token);

        debug_assert!(tokens.len() <= self.capacity, "ledger exceeded capacity");
        LedgerInsert::Inserted { evicted }
    }

    /// Point-in-time copy, oldest first.
    pub fn snapshot(&self) -> Vec<VersionToken> {
        self.tokens.lock().iter().cloned().collect()
    }

    pub fn contains(&self, token: &VersionToken) -> bool {
        self.tokens.lock().contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for VersionLedger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_CAPACITY)
    }
}
