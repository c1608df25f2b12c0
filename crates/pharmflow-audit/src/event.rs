//! Activity event and trail types.
//!
//! Every `ActivityEvent` carries two links: `prev_hash` to the event before
//! it in the trail, and `intake_prev_hash` to the previous event of the same
//! intake. The first link orders the whole counter's activity; the second
//! lets one intake's history be checked on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pharmflow_contracts::{activity::ActivityEntry, intake::IntakeId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Position in the trail, starting at 0.
    pub sequence: u64,

    pub entry: ActivityEntry,

    /// `this_hash` of the previous event in the trail, or `GENESIS_HASH`.
    pub prev_hash: String,

    /// `this_hash` of the previous event for `entry.intake_id`, or
    /// `GENESIS_HASH` for the intake's first event.
    pub intake_prev_hash: String,

    /// SHA-256 (hex), see `chain::hash_event`.
    pub this_hash: String,
}

impl ActivityEvent {
    /// Link target of every first event: 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";

    pub fn intake_id(&self) -> IntakeId {
        self.entry.intake_id
    }
}

/// An exported activity trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityTrail {
    pub trail_id: String,

    /// All events in trail order.
    pub events: Vec<ActivityEvent>,

    pub exported_at: DateTime<Utc>,

    /// `this_hash` of the last event; empty when the trail is empty.
    pub terminal_hash: String,
}

impl ActivityTrail {
    /// The events of one intake, oldest first.
    pub fn history_of(&self, intake_id: IntakeId) -> Vec<ActivityEvent> {
        self.events
            .iter()
            .filter(|e| e.intake_id() == intake_id)
            .cloned()
            .collect()
    }
}
