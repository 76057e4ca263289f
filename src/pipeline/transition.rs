//! Transition decisions between consecutive readings.
//!
//! Compares a fresh reading against the previously persisted record and
//! classifies what the check cycle should do. The decision is pure so the
//! notification rules can be tested without a store or a mail server.

use crate::models::{Reading, StatusRecord, StockStatus};

/// What a check cycle should do with a fresh reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// First observation for this item: record it, never notify.
    Baseline,

    /// Same status as before: only the timestamp advances.
    Unchanged,

    /// Inconclusive reading over a confirmed status: keep the record,
    /// advance the timestamp.
    Hold,

    /// Status changed: replace the record; notify iff now available.
    Changed { notify: bool },
}

/// Decide the action for `current` given the previous record, if any.
///
/// `Unknown` is its own value for comparison purposes: an unknown reading
/// repeats an unknown record (`Unchanged`), but never overwrites a
/// confirmed true/false (`Hold`).
pub fn decide(previous: Option<&StatusRecord>, current: &Reading) -> Decision {
    let Some(previous) = previous else {
        return Decision::Baseline;
    };

    if previous.in_stock == current.status {
        return Decision::Unchanged;
    }

    if !current.status.is_known() && previous.in_stock.is_known() {
        return Decision::Hold;
    }

    Decision::Changed {
        notify: current.status.is_available(),
    }
}
