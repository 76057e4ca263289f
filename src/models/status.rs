//! Stock status primitives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tri-state availability of a monitored item.
///
/// Serialized as `true` / `false` / `null` so the status file keeps the
/// same shape regardless of whether a check succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum StockStatus {
    /// At least one variant can be purchased
    Available,

    /// No variant can be purchased
    Unavailable,

    /// The check could not determine availability
    Unknown,
}

impl From<Option<bool>> for StockStatus {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => StockStatus::Available,
            Some(false) => StockStatus::Unavailable,
            None => StockStatus::Unknown,
        }
    }
}

impl From<StockStatus> for Option<bool> {
    fn from(value: StockStatus) -> Self {
        match value {
            StockStatus::Available => Some(true),
            StockStatus::Unavailable => Some(false),
            StockStatus::Unknown => None,
        }
    }
}

impl StockStatus {
    /// Whether this status should trigger a restock notification.
    pub fn is_available(self) -> bool {
        self == StockStatus::Available
    }

    /// Whether this status is a confirmed reading (not `Unknown`).
    pub fn is_known(self) -> bool {
        self != StockStatus::Unknown
    }
}

/// One detector observation: a status plus a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub status: StockStatus,
    pub message: String,
}

impl Reading {
    pub fn available(message: impl Into<String>) -> Self {
        Self {
            status: StockStatus::Available,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StockStatus::Unavailable,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            status: StockStatus::Unknown,
            message: message.into(),
        }
    }
}

/// Last observed state for one item, as persisted in the status file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusRecord {
    /// Last confirmed (or unknown) availability
    pub in_stock: StockStatus,

    /// Explanation attached to the reading that produced this record
    pub message: String,

    /// When the item was last checked
    pub last_checked: DateTime<Utc>,
}

impl StatusRecord {
    /// Build a record from a fresh reading.
    pub fn from_reading(reading: &Reading, at: DateTime<Utc>) -> Self {
        Self {
            in_stock: reading.status,
            message: reading.message.clone(),
            last_checked: at,
        }
    }
}
