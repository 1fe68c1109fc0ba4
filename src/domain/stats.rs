use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Cents, Entry, EntryCategory, EntryStatus};

/// Summary statistics over a filtered entry set.
///
/// Conservation holds by construction: every entry has exactly one status
/// and one category, so `total_received + total_pending` and the sum over
/// `total_by_category` both equal the total amount of the input set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total_received: Cents,
    pub total_pending: Cents,
    /// Always fully populated over the category enumeration, never sparse.
    pub total_by_category: HashMap<EntryCategory, Cents>,
    pub total_count: usize,
}

impl LedgerStats {
    pub fn total_amount(&self) -> Cents {
        self.total_received + self.total_pending
    }
}

/// Reduce an entry set into summary statistics. Pure function of its input;
/// never mutates and never touches the store.
pub fn compute_stats(entries: &[Entry]) -> LedgerStats {
    let mut total_by_category: HashMap<EntryCategory, Cents> =
        EntryCategory::ALL.iter().map(|cat| (*cat, 0)).collect();

    let mut total_received = 0;
    let mut total_pending = 0;

    for entry in entries {
        match entry.status {
            EntryStatus::Received => total_received += entry.amount_cents,
            EntryStatus::Pending => total_pending += entry.amount_cents,
        }
        *total_by_category.entry(entry.category).or_insert(0) += entry.amount_cents;
    }

    LedgerStats {
        total_received,
        total_pending,
        total_by_category,
        total_count: entries.len(),
    }
}
