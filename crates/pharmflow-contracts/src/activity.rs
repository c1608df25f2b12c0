//! Activity entries: one immutable record per committed workflow mutation.
//!
//! The workflow hands each entry to an `ActivityWriter` right after the
//! store accepts the change. Entries are never modified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intake::{DispenseMark, IntakeId, IntakeStatus};

/// What a committed workflow operation did to an intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntakeOperation {
    Created { warning_count: usize },
    StatusChanged { from: IntakeStatus, to: IntakeStatus },
    Assigned { user: String },
    CounselingUpdated,
    PharmacistNotesUpdated,
    Dispensed {
        value: DispenseMark,
        /// True when the call moved a `filled` intake to `dispensed`.
        auto_advanced: bool,
    },
    InteractionsRechecked { warning_count: usize },
}

/// One entry of the activity trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub intake_id: IntakeId,
    pub operation: IntakeOperation,
    /// Wall-clock time of the committed change (UTC).
    pub timestamp: DateTime<Utc>,
}
