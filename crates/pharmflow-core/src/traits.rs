//! Core trait definitions for the PHARMFLOW intake pipeline.
//!
//! These two traits are the workflow's collaborators:
//!
//! - `IntakeStore`:    owns identity assignment and durable intake state
//! - `ActivityWriter`: trusted sink recording every committed mutation
//!
//! The workflow holds no mutable state of its own; everything it reads or
//! writes goes through these seams.

use std::sync::Arc;

use pharmflow_contracts::{
    activity::ActivityEntry,
    error::PharmResult,
    intake::{Intake, IntakeFilter, IntakeId, IntakeRecord},
};

/// Persistence for intake records.
///
/// Implementations must be safe to share across threads; each method is one
/// store round-trip.
pub trait IntakeStore: Send + Sync {
    /// Persist a new record and return its freshly assigned, unique id.
    ///
    /// The stored intake starts at version 0.
    fn insert(&self, record: IntakeRecord) -> PharmResult<IntakeId>;

    /// Return the intake with `id`, or `None` if no such record exists.
    fn find_by_id(&self, id: IntakeId) -> PharmResult<Option<Intake>>;

    /// Return every intake matching `filter`, newest first.
    ///
    /// Ties on `created_at` are broken by insertion order, later first.
    fn find_all(&self, filter: &IntakeFilter) -> PharmResult<Vec<Intake>>;

    /// Overwrite the stored record of `intake.id` with `intake.record`.
    ///
    /// The write is accepted only if the stored version equals
    /// `intake.version`; the store then increments it. A stale version
    /// returns `PharmError::Conflict`, an unknown id `PharmError::NotFound`.
    fn update(&self, intake: &Intake) -> PharmResult<()>;

    /// Count the intakes for which `predicate` returns true.
    fn count_where(&self, predicate: &dyn Fn(&Intake) -> bool) -> PharmResult<u64>;
}

/// The activity sink: one entry per committed workflow mutation.
///
/// Called after the store accepted the change. An error here is logged by
/// the workflow and does not undo or fail the committed operation.
pub trait ActivityWriter: Send + Sync {
    /// Append one entry. Implementations must treat this as append-only.
    fn record(&self, entry: &ActivityEntry) -> PharmResult<()>;
}

impl<T: IntakeStore + ?Sized> IntakeStore for Arc<T> {
    fn insert(&self, record: IntakeRecord) -> PharmResult<IntakeId> {
        (**self).insert(record)
    }

    fn find_by_id(&self, id: IntakeId) -> PharmResult<Option<Intake>> {
        (**self).find_by_id(id)
    }

    fn find_all(&self, filter: &IntakeFilter) -> PharmResult<Vec<Intake>> {
        (**self).find_all(filter)
    }

    fn update(&self, intake: &Intake) -> PharmResult<()> {
        (**self).update(intake)
    }

    fn count_where(&self, predicate: &dyn Fn(&Intake) -> bool) -> PharmResult<u64> {
        (**self).count_where(predicate)
    }
}

impl<T: ActivityWriter + ?Sized> ActivityWriter for Arc<T> {
    fn record(&self, entry: &ActivityEntry) -> PharmResult<()> {
        (**self).record(entry)
    }
}
