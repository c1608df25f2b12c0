//! Hash-chain primitives for the activity trail.
//!
//! Hash input layout (bytes, in order):
//!   1. trail_id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash (64 ASCII hex chars)
//!   4. intake_prev_hash (64 ASCII hex chars)
//!   5. compact JSON of the activity entry

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use pharmflow_contracts::{activity::ActivityEntry, intake::IntakeId};

use crate::event::ActivityEvent;

/// Compute the lowercase hex SHA-256 of one event.
///
/// # Panics
///
/// Panics if `entry` cannot be serialized to JSON, which cannot happen for
/// `ActivityEntry`: every field is a plain string, number, or enum.
pub fn hash_event(
    trail_id: &str,
    sequence: u64,
    prev_hash: &str,
    intake_prev_hash: &str,
    entry: &ActivityEntry,
) -> String {
    let entry_json =
        serde_json::to_vec(entry).expect("ActivityEntry must always be serializable to JSON");

    let mut hasher = Sha256::new();
    hasher.update(trail_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(intake_prev_hash.as_bytes());
    hasher.update(&entry_json);

    hex::encode(hasher.finalize())
}

fn hash_matches(trail_id: &str, event: &ActivityEvent) -> bool {
    event.this_hash
        == hash_event(
            trail_id,
            event.sequence,
            &event.prev_hash,
            &event.intake_prev_hash,
            &event.entry,
        )
}

/// Check a whole trail.
///
/// Valid when sequence numbers run 0, 1, 2, … without gaps, every
/// `prev_hash` names the preceding event, every `intake_prev_hash` names the
/// preceding event of the same intake, and every `this_hash` recomputes.
/// An empty trail is valid.
pub fn verify_chain(trail_id: &str, events: &[ActivityEvent]) -> bool {
    let mut expected_prev: &str = ActivityEvent::GENESIS_HASH;
    let mut intake_heads: HashMap<IntakeId, &str> = HashMap::new();

    for (position, event) in events.iter().enumerate() {
        let intake_head = intake_heads
            .get(&event.intake_id())
            .copied()
            .unwrap_or(ActivityEvent::GENESIS_HASH);

        if event.sequence != position as u64
            || event.prev_hash != expected_prev
            || event.intake_prev_hash != intake_head
            || !hash_matches(trail_id, event)
        {
            return false;
        }

        expected_prev = event.this_hash.as_str();
        intake_heads.insert(event.intake_id(), event.this_hash.as_str());
    }

    true
}

/// Check one intake's history, as returned by `entries_for`.
///
/// Valid when all events belong to one intake, appear in increasing trail
/// order, start from the genesis hash, link through `intake_prev_hash`, and
/// recompute. Events of other intakes are not needed. An empty history is
/// valid.
pub fn verify_history(trail_id: &str, history: &[ActivityEvent]) -> bool {
    let Some(first) = history.first() else {
        return true;
    };
    let intake_id = first.intake_id();
    let mut expected_prev: &str = ActivityEvent::GENESIS_HASH;
    let mut last_sequence: Option<u64> = None;

    for event in history {
        if event.intake_id() != intake_id
            || last_sequence.is_some_and(|seq| event.sequence <= seq)
            || event.intake_prev_hash != expected_prev
            || !hash_matches(trail_id, event)
        {
            return false;
        }

        expected_prev = event.this_hash.as_str();
        last_sequence = Some(event.sequence);
    }

    true
}
