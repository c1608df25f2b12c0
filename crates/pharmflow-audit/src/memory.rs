//! In-memory implementation of `ActivityWriter`.
//!
//! `InMemoryActivityLog` keeps the trail in a `Vec` behind a `Mutex`, along
//! with the latest hash of every intake so each new event can link to its
//! intake's previous one. Clones share one trail, so a caller can hand one
//! clone to the workflow and keep another for inspection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use pharmflow_contracts::{
    activity::ActivityEntry,
    error::{PharmError, PharmResult},
    intake::IntakeId,
};
use pharmflow_core::traits::ActivityWriter;

use crate::{
    chain::{hash_event, verify_chain, verify_history},
    event::{ActivityEvent, ActivityTrail},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct TrailState {
    /// Events in append order.
    pub(crate) events: Vec<ActivityEvent>,

    /// `this_hash` of the last event, or `GENESIS_HASH` while empty.
    pub(crate) last_hash: String,

    /// `this_hash` of each intake's latest event.
    pub(crate) intake_heads: HashMap<IntakeId, String>,
}

// ── Public log ────────────────────────────────────────────────────────────────

/// An append-only activity trail with per-intake hash links.
#[derive(Clone)]
pub struct InMemoryActivityLog {
    trail_id: String,
    pub(crate) state: Arc<Mutex<TrailState>>,
}

impl InMemoryActivityLog {
    pub fn new(trail_id: impl Into<String>) -> Self {
        Self {
            trail_id: trail_id.into(),
            state: Arc::new(Mutex::new(TrailState {
                events: Vec::new(),
                last_hash: ActivityEvent::GENESIS_HASH.to_string(),
                intake_heads: HashMap::new(),
            })),
        }
    }

    pub fn trail_id(&self) -> &str {
        &self.trail_id
    }

    pub fn len(&self) -> PharmResult<usize> {
        Ok(self.lock()?.events.len())
    }

    pub fn is_empty(&self) -> PharmResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of distinct intakes with at least one event.
    pub fn intake_count(&self) -> PharmResult<usize> {
        Ok(self.lock()?.intake_heads.len())
    }

    /// The events recorded for one intake, oldest first.
    pub fn entries_for(&self, intake_id: IntakeId) -> PharmResult<Vec<ActivityEvent>> {
        let state = self.lock()?;
        Ok(state
            .events
            .iter()
            .filter(|e| e.intake_id() == intake_id)
            .cloned()
            .collect())
    }

    /// Snapshot the whole trail.
    pub fn export_log(&self) -> PharmResult<ActivityTrail> {
        let state = self.lock()?;
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        Ok(ActivityTrail {
            trail_id: self.trail_id.clone(),
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        })
    }

    /// Whether the whole trail is still intact.
    pub fn verify_integrity(&self) -> PharmResult<bool> {
        let state = self.lock()?;
        Ok(verify_chain(&self.trail_id, &state.events))
    }

    /// Whether one intake's history is intact, without walking other intakes.
    pub fn verify_intake(&self, intake_id: IntakeId) -> PharmResult<bool> {
        let history = self.entries_for(intake_id)?;
        Ok(verify_history(&self.trail_id, &history))
    }

    fn lock(&self) -> PharmResult<MutexGuard<'_, TrailState>> {
        self.state.lock().map_err(|e| PharmError::ActivityWriteFailed {
            reason: format!("activity trail lock poisoned: {}", e),
        })
    }
}

// ── ActivityWriter impl ───────────────────────────────────────────────────────

impl ActivityWriter for InMemoryActivityLog {
    fn record(&self, entry: &ActivityEntry) -> PharmResult<()> {
        let mut state = self.lock()?;

        let sequence = state.events.len() as u64;
        let prev_hash = state.last_hash.clone();
        let intake_prev_hash = state
            .intake_heads
            .get(&entry.intake_id)
            .cloned()
            .unwrap_or_else(|| ActivityEvent::GENESIS_HASH.to_string());
        let this_hash = hash_event(&self.trail_id, sequence, &prev_hash, &intake_prev_hash, entry);

        state.events.push(ActivityEvent {
            sequence,
            entry: entry.clone(),
            prev_hash,
            intake_prev_hash,
            this_hash: this_hash.clone(),
        });
        state.intake_heads.insert(entry.intake_id, this_hash.clone());
        state.last_hash = this_hash;

        debug!(intake_id = %entry.intake_id, sequence, "activity recorded");
        Ok(())
    }
}
