//! The intake workflow: the state-machine owner of every intake.
//!
//! Every mutating operation follows the same pipeline:
//!
//!   Validate input → Read (store) → Validate state → Mutate → Write (store) → Activity
//!
//! Validation failures return before the write, so a rejected request never
//! reaches the store. The write is a versioned overwrite; a concurrent change
//! to the same intake surfaces as `PharmError::Conflict` and is not retried.
//!
//! The store write is the commit point. Once it succeeds the operation
//! succeeds; a failing activity writer is logged, never reported as a
//! failure of a change that is already saved.

use chrono::Utc;
use tracing::{debug, info, warn};

use pharmflow_contracts::{
    activity::{ActivityEntry, IntakeOperation},
    error::{PharmError, PharmResult},
    intake::{DispenseMark, Intake, IntakeFilter, IntakeId, IntakeRecord, IntakeStatus, NewIntake},
    interaction::InteractionReport,
    statistics::IntakeStatistics,
};
use pharmflow_interactions::{CounselingGenerator, InteractionChecker, KnowledgeBase};

use crate::{
    traits::{ActivityWriter, IntakeStore},
    transitions::TransitionTable,
};

/// Owns the intake lifecycle.
///
/// The workflow holds only immutable collaborators, so one instance can
/// serve concurrent requests; all state lives in the store.
pub struct IntakeWorkflow {
    store: Box<dyn IntakeStore>,
    activity: Box<dyn ActivityWriter>,
    checker: InteractionChecker,
    counseling: CounselingGenerator,
    transitions: TransitionTable,
}

impl IntakeWorkflow {
    /// Create a workflow over `store`, recording to `activity`, using the
    /// rules in `knowledge` and the standard transition table.
    pub fn new(
        store: Box<dyn IntakeStore>,
        activity: Box<dyn ActivityWriter>,
        knowledge: KnowledgeBase,
    ) -> Self {
        Self {
            store,
            activity,
            checker: knowledge.checker,
            counseling: knowledge.counseling,
            transitions: TransitionTable::standard(),
        }
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// Register a new intake.
    ///
    /// Interactions and counseling points are computed here, once, from the
    /// submitted medication lists.
    pub fn create(&self, data: NewIntake) -> PharmResult<Intake> {
        debug!(patient = %data.patient_name, "creating intake");

        let interactions = self
            .checker
            .check(&data.medications, data.current_medications.as_deref());
        let counseling_points = self.counseling.generate(&data.medications, &interactions);
        let warning_count = interactions.len();

        let now = Utc::now();
        let record = IntakeRecord {
            patient_name: data.patient_name,
            patient_age: data.patient_age,
            patient_allergies: data.patient_allergies,
            medications: data.medications,
            current_medications: data.current_medications,
            notes: data.notes,
            counseling_points,
            pharmacist_notes: None,
            drug_interactions: interactions,
            status: IntakeStatus::New,
            assigned_to: None,
            dispensed: None,
            dispensed_at: None,
            created_at: now,
            updated_at: now,
        };

        let id = self.store.insert(record.clone())?;
        self.record_activity(id, IntakeOperation::Created { warning_count });

        info!(intake_id = %id, warnings = warning_count, "intake created");
        Ok(Intake { id, version: 0, record })
    }

    /// All intakes matching `filter`, newest first.
    pub fn list(&self, filter: &IntakeFilter) -> PharmResult<Vec<Intake>> {
        debug!(status = ?filter.status, assigned_to = ?filter.assigned_to, "listing intakes");
        self.store.find_all(filter)
    }

    pub fn get(&self, id: IntakeId) -> PharmResult<Intake> {
        self.store
            .find_by_id(id)?
            .ok_or(PharmError::NotFound { id })
    }

    /// Move an intake to `target` along an edge of the transition table.
    pub fn update_status(&self, id: IntakeId, target: IntakeStatus) -> PharmResult<Intake> {
        let mut intake = self.get(id)?;
        let from = intake.record.status;

        if let Err(e) = self.transitions.check(from, target) {
            warn!(intake_id = %id, from = %from, to = %target, "transition rejected");
            return Err(e);
        }

        intake.record.status = target;
        intake.record.updated_at = Utc::now();
        self.commit(intake, IntakeOperation::StatusChanged { from, to: target })
    }

    /// Assign the intake to `user`. The user is not validated.
    pub fn assign(&self, id: IntakeId, user: impl Into<String>) -> PharmResult<Intake> {
        let user = user.into();
        let mut intake = self.get(id)?;

        intake.record.assigned_to = Some(user.clone());
        intake.record.updated_at = Utc::now();
        self.commit(intake, IntakeOperation::Assigned { user })
    }

    /// Manually overwrite the counseling text.
    ///
    /// The text stays as written until the next `recheck_interactions`.
    pub fn update_counseling_points(
        &self,
        id: IntakeId,
        counseling_points: impl Into<String>,
    ) -> PharmResult<Intake> {
        let mut intake = self.get(id)?;

        intake.record.counseling_points = counseling_points.into();
        intake.record.updated_at = Utc::now();
        self.commit(intake, IntakeOperation::CounselingUpdated)
    }

    pub fn update_pharmacist_notes(
        &self,
        id: IntakeId,
        pharmacist_notes: impl Into<String>,
    ) -> PharmResult<Intake> {
        let mut intake = self.get(id)?;

        intake.record.pharmacist_notes = Some(pharmacist_notes.into());
        intake.record.updated_at = Utc::now();
        self.commit(intake, IntakeOperation::PharmacistNotesUpdated)
    }

    /// Record whether the medication was handed over (`"yes"` / `"no"`).
    ///
    /// On `"yes"`: `dispensed_at` is set if it was unset, and a `filled`
    /// intake moves straight to `dispensed`. This advance deliberately does
    /// not go through the transition table. `"no"` leaves status and
    /// `dispensed_at` untouched.
    pub fn dispense(&self, id: IntakeId, dispensed: &str) -> PharmResult<Intake> {
        let mark: DispenseMark = dispensed.parse()?;
        let mut intake = self.get(id)?;
        let now = Utc::now();

        intake.record.dispensed = Some(mark);
        let mut auto_advanced = false;
        if mark == DispenseMark::Yes {
            if intake.record.dispensed_at.is_none() {
                intake.record.dispensed_at = Some(now);
            }
            if intake.record.status == IntakeStatus::Filled {
                intake.record.status = IntakeStatus::Dispensed;
                auto_advanced = true;
            }
        }
        intake.record.updated_at = now;

        self.commit(
            intake,
            IntakeOperation::Dispensed {
                value: mark,
                auto_advanced,
            },
        )
    }

    /// Recompute interactions and counseling points from the stored
    /// medication lists and persist both.
    pub fn recheck_interactions(&self, id: IntakeId) -> PharmResult<InteractionReport> {
        let mut intake = self.get(id)?;

        let interactions = self.checker.check(
            &intake.record.medications,
            intake.record.current_medications.as_deref(),
        );
        let counseling_points = self
            .counseling
            .generate(&intake.record.medications, &interactions);
        let warning_count = interactions.len();

        intake.record.drug_interactions = interactions.clone();
        intake.record.counseling_points = counseling_points.clone();
        intake.record.updated_at = Utc::now();
        self.commit(intake, IntakeOperation::InteractionsRechecked { warning_count })?;

        Ok(InteractionReport {
            interactions,
            counseling_points,
        })
    }

    /// Totals, per-status counts (all seven, zero-filled), and dispensed count.
    pub fn statistics(&self) -> PharmResult<IntakeStatistics> {
        let mut stats = IntakeStatistics::empty();
        stats.total = self.store.count_where(&|_: &Intake| true)?;

        for status in IntakeStatus::ALL {
            let count = self
                .store
                .count_where(&|intake: &Intake| intake.record.status == status)?;
            stats.by_status.insert(status, count);
        }

        stats.dispensed_count = self
            .store
            .count_where(&|intake: &Intake| intake.record.dispensed == Some(DispenseMark::Yes))?;

        Ok(stats)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// Write `intake` back to the store, record the activity, and return the
    /// intake at its new version. Only the store write can fail the call.
    fn commit(&self, mut intake: Intake, operation: IntakeOperation) -> PharmResult<Intake> {
        if let Err(e) = self.store.update(&intake) {
            warn!(intake_id = %intake.id, error = %e, "intake update rejected by store");
            return Err(e);
        }
        intake.version += 1;

        info!(
            intake_id = %intake.id,
            status = %intake.record.status,
            operation = ?operation,
            "intake updated"
        );
        self.record_activity(intake.id, operation);
        Ok(intake)
    }

    /// Append to the activity trail after a committed write.
    fn record_activity(&self, intake_id: IntakeId, operation: IntakeOperation) {
        let entry = ActivityEntry {
            intake_id,
            operation,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.activity.record(&entry) {
            warn!(
                intake_id = %intake_id,
                operation = ?entry.operation,
                error = %e,
                "activity not recorded for committed change"
            );
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
