//! The call ledger driving reverse-order compensation.

use crate::unit::UnitHandle;
use parking_lot::RwLock;

/// An ordered, append-only record of the units that completed
/// successfully against one context.
///
/// The ledger holds a handle per completed unit; it does not manage the
/// unit's lifetime beyond being able to invoke its compensation. Rollback
/// reads it newest-first; nothing ever removes entries, so the ledger
/// stays inspectable after a rollback.
#[derive(Debug, Default)]
pub struct CallLedger {
    entries: RwLock<Vec<UnitHandle>>,
}

impl CallLedger {
    /// Creates a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a completed unit.
    pub fn record(&self, unit: UnitHandle) {
        self.entries.write().push(unit);
    }

    /// Returns the recorded handles in completion order.
    #[must_use]
    pub fn entries(&self) -> Vec<UnitHandle> {
        self.entries.read().clone()
    }

    /// Returns the recorded unit names in completion order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .map(|unit| unit.name().to_string())
            .collect()
    }

    /// Returns the number of recorded completions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing has completed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
