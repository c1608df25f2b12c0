//! Intake identity, lifecycle status, and record types.
//!
//! An `Intake` is the store's view of one prescription-processing record:
//! the store-assigned `id` and `version` wrapped around the `IntakeRecord`
//! the workflow computes and mutates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{PharmError, PharmResult},
    interaction::{interactions_column, InteractionWarning},
};

/// Store-assigned, immutable identifier of an intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntakeId(pub uuid::Uuid);

impl IntakeId {
    /// Create a new, unique intake ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for IntakeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IntakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IntakeId {
    type Err = PharmError;

    fn from_str(s: &str) -> PharmResult<Self> {
        uuid::Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| PharmError::InvalidInput {
                reason: format!("'{}' is not a valid intake id: {}", s, e),
            })
    }
}

/// The workflow states an intake moves through.
///
/// Declaration order is the forward order of the workflow; `Ord` follows it,
/// so maps keyed by status iterate new → completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStatus {
    New,
    Triage,
    WaitingInfo,
    ReadyToFill,
    Filled,
    Dispensed,
    Completed,
}

impl IntakeStatus {
    /// Every status, in workflow order.
    pub const ALL: [IntakeStatus; 7] = [
        IntakeStatus::New,
        IntakeStatus::Triage,
        IntakeStatus::WaitingInfo,
        IntakeStatus::ReadyToFill,
        IntakeStatus::Filled,
        IntakeStatus::Dispensed,
        IntakeStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntakeStatus::New => "new",
            IntakeStatus::Triage => "triage",
            IntakeStatus::WaitingInfo => "waiting_info",
            IntakeStatus::ReadyToFill => "ready_to_fill",
            IntakeStatus::Filled => "filled",
            IntakeStatus::Dispensed => "dispensed",
            IntakeStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for IntakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntakeStatus {
    type Err = PharmError;

    fn from_str(s: &str) -> PharmResult<Self> {
        IntakeStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| PharmError::InvalidInput {
                reason: format!("unknown intake status '{}'", s),
            })
    }
}

/// Whether the medication was handed to the patient.
///
/// Stored as `Option<DispenseMark>`: `None` means never recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispenseMark {
    Yes,
    No,
}

impl DispenseMark {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispenseMark::Yes => "yes",
            DispenseMark::No => "no",
        }
    }
}

impl fmt::Display for DispenseMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DispenseMark {
    type Err = PharmError;

    /// Accepts exactly `"yes"` or `"no"`.
    fn from_str(s: &str) -> PharmResult<Self> {
        match s {
            "yes" => Ok(DispenseMark::Yes),
            "no" => Ok(DispenseMark::No),
            other => Err(PharmError::InvalidInput {
                reason: format!("dispensed must be 'yes' or 'no', got '{}'", other),
            }),
        }
    }
}

/// The creation payload for a new intake, as submitted at the counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIntake {
    pub patient_name: String,
    #[serde(default)]
    pub patient_age: Option<u32>,
    #[serde(default)]
    pub patient_allergies: Option<String>,
    /// Delimiter-separated list of newly prescribed medications.
    pub medications: String,
    /// Delimiter-separated list of what the patient already takes.
    #[serde(default)]
    pub current_medications: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Every intake field except the store-owned identity and revision.
///
/// The workflow builds this on creation and mutates it on every operation;
/// the store persists it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub patient_name: String,
    pub patient_age: Option<u32>,
    pub patient_allergies: Option<String>,
    pub medications: String,
    pub current_medications: Option<String>,
    pub notes: Option<String>,
    /// Derived on creation and re-check; may be overwritten manually.
    pub counseling_points: String,
    pub pharmacist_notes: Option<String>,
    /// Derived on creation and re-check. Persisted as JSON text, `null` when empty.
    #[serde(default, with = "interactions_column")]
    pub drug_interactions: Vec<InteractionWarning>,
    pub status: IntakeStatus,
    pub assigned_to: Option<String>,
    pub dispensed: Option<DispenseMark>,
    /// Set on the first `yes` and never moved afterwards.
    pub dispensed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored intake: identity, revision, and the record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intake {
    pub id: IntakeId,
    /// Revision counter owned by the store; bumped on every committed update.
    #[serde(default)]
    pub version: u64,
    #[serde(flatten)]
    pub record: IntakeRecord,
}

/// Optional equality filters for listing intakes. Empty filter matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeFilter {
    pub status: Option<IntakeStatus>,
    pub assigned_to: Option<String>,
}

impl IntakeFilter {
    pub fn matches(&self, intake: &Intake) -> bool {
        let status_matches = self
            .status
            .map_or(true, |status| intake.record.status == status);
        let assignee_matches = self
            .assigned_to
            .as_deref()
            .map_or(true, |user| intake.record.assigned_to.as_deref() == Some(user));
        status_matches && assignee_matches
    }
}
