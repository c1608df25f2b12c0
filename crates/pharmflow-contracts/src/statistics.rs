//! Aggregate counts over the intake store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::intake::IntakeStatus;

/// Dashboard summary: totals, per-status counts, and dispensed count.
///
/// `by_status` always holds all seven statuses, zero-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeStatistics {
    pub total: u64,
    pub by_status: BTreeMap<IntakeStatus, u64>,
    pub dispensed_count: u64,
}

impl IntakeStatistics {
    /// A summary with every count at zero.
    pub fn empty() -> Self {
        Self {
            total: 0,
            by_status: IntakeStatus::ALL.into_iter().map(|s| (s, 0)).collect(),
            dispensed_count: 0,
        }
    }
}
