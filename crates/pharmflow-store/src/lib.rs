//! # pharmflow-store
//!
//! In-memory implementation of `IntakeStore`.
//!
//! Records live in a `Vec` in insertion order behind an `Arc<Mutex<_>>`, so
//! clones of an `InMemoryIntakeStore` share one dataset. Every write is a
//! versioned overwrite: the caller must present the version it read, and a
//! stale version is rejected with `PharmError::Conflict`.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use pharmflow_contracts::{
    error::{PharmError, PharmResult},
    intake::{Intake, IntakeFilter, IntakeId, IntakeRecord},
};
use pharmflow_core::traits::IntakeStore;

// ── Internal mutable state ────────────────────────────────────────────────────

struct StoreState {
    /// Every stored intake, oldest insert first.
    intakes: Vec<Intake>,
}

// ── Public store ──────────────────────────────────────────────────────────────

/// A process-local intake store.
///
/// Cloning is cheap and yields a handle onto the same records.
#[derive(Clone)]
pub struct InMemoryIntakeStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryIntakeStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                intakes: Vec::new(),
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.intakes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> PharmResult<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|e| PharmError::StoreFailed {
            reason: format!("intake store lock poisoned: {}", e),
        })
    }
}

impl Default for InMemoryIntakeStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── IntakeStore impl ──────────────────────────────────────────────────────────

impl IntakeStore for InMemoryIntakeStore {
    fn insert(&self, record: IntakeRecord) -> PharmResult<IntakeId> {
        let mut state = self.lock()?;

        let mut id = IntakeId::new();
        while state.intakes.iter().any(|i| i.id == id) {
            id = IntakeId::new();
        }

        state.intakes.push(Intake {
            id,
            version: 0,
            record,
        });
        debug!(intake_id = %id, total = state.intakes.len(), "intake inserted");
        Ok(id)
    }

    fn find_by_id(&self, id: IntakeId) -> PharmResult<Option<Intake>> {
        let state = self.lock()?;
        Ok(state.intakes.iter().find(|i| i.id == id).cloned())
    }

    fn find_all(&self, filter: &IntakeFilter) -> PharmResult<Vec<Intake>> {
        let state = self.lock()?;

        // Insertion order reversed, then a stable sort on created_at keeps
        // later inserts first among equal timestamps.
        let mut matching: Vec<Intake> = state
            .intakes
            .iter()
            .rev()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
        Ok(matching)
    }

    fn update(&self, intake: &Intake) -> PharmResult<()> {
        let mut state = self.lock()?;

        let stored = state
            .intakes
            .iter_mut()
            .find(|i| i.id == intake.id)
            .ok_or(PharmError::NotFound { id: intake.id })?;

        if stored.version != intake.version {
            debug!(
                intake_id = %intake.id,
                stored = stored.version,
                presented = intake.version,
                "stale intake version"
            );
            return Err(PharmError::Conflict { id: intake.id });
        }

        stored.record = intake.record.clone();
        stored.version += 1;
        Ok(())
    }

    fn count_where(&self, predicate: &dyn Fn(&Intake) -> bool) -> PharmResult<u64> {
        let state = self.lock()?;
        Ok(state.intakes.iter().filter(|i| predicate(i)).count() as u64)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use pharmflow_contracts::{
        error::PharmError,
        intake::{Intake, IntakeFilter, IntakeId, IntakeRecord, IntakeStatus},
    };
    use pharmflow_core::traits::IntakeStore;

    use super::InMemoryIntakeStore;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn record(patient: &str, minutes: i64) -> IntakeRecord {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
        IntakeRecord {
            patient_name: patient.to_string(),
            patient_age: None,
            patient_allergies: None,
            medications: "metformin".to_string(),
            current_medications: None,
            notes: None,
            counseling_points: String::new(),
            pharmacist_notes: None,
            drug_interactions: Vec::new(),
            status: IntakeStatus::New,
            assigned_to: None,
            dispensed: None,
            dispensed_at: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn names(store: &InMemoryIntakeStore, filter: &IntakeFilter) -> Vec<String> {
        store
            .find_all(filter)
            .unwrap()
            .into_iter()
            .map(|i| i.record.patient_name)
            .collect()
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_insert_assigns_unique_ids() {
        let store = InMemoryIntakeStore::new();
        let a = store.insert(record("a", 0)).unwrap();
        let b = store.insert(record("b", 0)).unwrap();

        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        let found = store.find_by_id(a).unwrap().unwrap();
        assert_eq!(found.version, 0);
        assert_eq!(found.record.patient_name, "a");
        assert!(store.find_by_id(IntakeId::new()).unwrap().is_none());
    }

    #[test]
    fn test_find_all_newest_first() {
        let store = InMemoryIntakeStore::new();
        store.insert(record("middle", 5)).unwrap();
        store.insert(record("oldest", 0)).unwrap();
        store.insert(record("newest", 10)).unwrap();

        assert_eq!(
            names(&store, &IntakeFilter::default()),
            vec!["newest", "middle", "oldest"]
        );
    }

    #[test]
    fn test_equal_timestamps_later_insert_first() {
        let store = InMemoryIntakeStore::new();
        store.insert(record("first", 0)).unwrap();
        store.insert(record("second", 0)).unwrap();
        store.insert(record("third", 0)).unwrap();

        assert_eq!(
            names(&store, &IntakeFilter::default()),
            vec!["third", "second", "first"]
        );
    }

    #[test]
    fn test_find_all_applies_filter() {
        let store = InMemoryIntakeStore::new();
        let mut triaged = record("triaged", 0);
        triaged.status = IntakeStatus::Triage;
        triaged.assigned_to = Some("bob".to_string());
        store.insert(triaged).unwrap();
        store.insert(record("fresh", 1)).unwrap();

        let filter = IntakeFilter {
            status: Some(IntakeStatus::Triage),
            assigned_to: None,
        };
        assert_eq!(names(&store, &filter), vec!["triaged"]);

        let filter = IntakeFilter {
            status: None,
            assigned_to: Some("alice".to_string()),
        };
        assert!(names(&store, &filter).is_empty());
    }

    #[test]
    fn test_update_bumps_version() {
        let store = InMemoryIntakeStore::new();
        let id = store.insert(record("a", 0)).unwrap();

        let mut intake = store.find_by_id(id).unwrap().unwrap();
        intake.record.status = IntakeStatus::Triage;
        store.update(&intake).unwrap();

        let stored = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.record.status, IntakeStatus::Triage);
    }

    /// Two readers of the same version: the second writer loses.
    #[test]
    fn test_stale_version_is_a_conflict() {
        let store = InMemoryIntakeStore::new();
        let id = store.insert(record("a", 0)).unwrap();

        let mut first = store.find_by_id(id).unwrap().unwrap();
        let mut second = first.clone();

        first.record.assigned_to = Some("alice".to_string());
        store.update(&first).unwrap();

        second.record.assigned_to = Some("bob".to_string());
        match store.update(&second) {
            Err(PharmError::Conflict { id: conflicted }) => assert_eq!(conflicted, id),
            other => panic!("expected Conflict, got {:?}", other),
        }

        let stored = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(stored.record.assigned_to.as_deref(), Some("alice"));
    }

    #[test]
    fn test_update_unknown_id() {
        let store = InMemoryIntakeStore::new();
        let id = store.insert(record("a", 0)).unwrap();
        let mut intake = store.find_by_id(id).unwrap().unwrap();
        intake.id = IntakeId::new();

        assert!(matches!(store.update(&intake), Err(PharmError::NotFound { .. })));
    }

    #[test]
    fn test_clones_share_records() {
        let store = InMemoryIntakeStore::new();
        let handle = store.clone();
        handle.insert(record("shared", 0)).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store
                .count_where(&|i: &Intake| i.record.patient_name == "shared")
                .unwrap(),
            1
        );
    }
}
