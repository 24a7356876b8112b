//! Soft-delete lifecycle and the listing views built on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which rows a listing query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListView {
    /// Every non-gone row, active and trashed.
    All,
    /// Rows with `deleted_at IS NULL`.
    Active,
    /// Rows with `deleted_at IS NOT NULL`.
    Trashed,
}

impl ListView {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Trashed => "trashed",
        }
    }

    /// Whether a row in the given lifecycle state belongs to this view.
    pub fn contains(self, state: Lifecycle) -> bool {
        match self {
            Self::All => true,
            Self::Active => state == Lifecycle::Active,
            Self::Trashed => state == Lifecycle::Trashed,
        }
    }
}

/// Persisted lifecycle state. A permanently deleted row has no state at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Active,
    Trashed,
}

impl Lifecycle {
    pub fn of(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            None => Self::Active,
            Some(_) => Self::Trashed,
        }
    }
}

/// Implemented by every soft-deletable record.
pub trait SoftDeletable {
    fn id(&self) -> i32;
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn lifecycle(&self) -> Lifecycle {
        Lifecycle::of(self.deleted_at())
    }
}
