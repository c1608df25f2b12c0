//! # pharmflow-contracts
//!
//! Shared types, schemas, and contracts for the PHARMFLOW workspace.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions and error types.

pub mod activity;
pub mod error;
pub mod intake;
pub mod interaction;
pub mod statistics;

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use error::PharmError;
    use intake::{DispenseMark, Intake, IntakeFilter, IntakeId, IntakeRecord, IntakeStatus};
    use interaction::{InteractionWarning, Severity};
    use statistics::IntakeStatistics;

    fn make_intake(status: IntakeStatus, assigned_to: Option<&str>) -> Intake {
        let now = Utc::now();
        Intake {
            id: IntakeId::new(),
            version: 0,
            record: IntakeRecord {
                patient_name: "Jane Roe".to_string(),
                patient_age: Some(67),
                patient_allergies: None,
                medications: "warfarin, aspirin".to_string(),
                current_medications: None,
                notes: None,
                counseling_points: String::new(),
                pharmacist_notes: None,
                drug_interactions: vec![],
                status,
                assigned_to: assigned_to.map(str::to_string),
                dispensed: None,
                dispensed_at: None,
                created_at: now,
                updated_at: now,
            },
        }
    }

    fn warning() -> InteractionWarning {
        InteractionWarning {
            drug1: "warfarin".to_string(),
            drug2: "aspirin".to_string(),
            severity: Severity::Major,
            description: "Major: Increased bleeding risk. Monitor INR closely.".to_string(),
        }
    }

    // ── IntakeStatus ─────────────────────────────────────────────────────────

    #[test]
    fn status_parses_every_wire_name() {
        for status in IntakeStatus::ALL {
            let parsed: IntakeStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert_eq!(
            serde_json::to_value(IntakeStatus::ReadyToFill).unwrap(),
            json!("ready_to_fill")
        );
    }

    #[test]
    fn status_rejects_unknown_name() {
        match "shipped".parse::<IntakeStatus>() {
            Err(PharmError::InvalidInput { reason }) => assert!(reason.contains("shipped")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn status_order_follows_workflow() {
        let mut shuffled = vec![
            IntakeStatus::Completed,
            IntakeStatus::New,
            IntakeStatus::Filled,
            IntakeStatus::Triage,
        ];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![
                IntakeStatus::New,
                IntakeStatus::Triage,
                IntakeStatus::Filled,
                IntakeStatus::Completed
            ]
        );
    }

    // ── DispenseMark ─────────────────────────────────────────────────────────

    #[test]
    fn dispense_mark_accepts_only_yes_and_no() {
        assert_eq!("yes".parse::<DispenseMark>().unwrap(), DispenseMark::Yes);
        assert_eq!("no".parse::<DispenseMark>().unwrap(), DispenseMark::No);
        assert!("YES".parse::<DispenseMark>().is_err());
        assert!("maybe".parse::<DispenseMark>().is_err());
    }

    // ── Severity ─────────────────────────────────────────────────────────────

    #[test]
    fn severity_is_derived_from_description_marker() {
        assert_eq!(
            Severity::from_description("Major: Risk of hyperkalemia."),
            Severity::Major
        );
        assert_eq!(
            Severity::from_description("Moderate: May enhance anticoagulant effect."),
            Severity::Moderate
        );
        // Lower-case marker does not count.
        assert_eq!(Severity::from_description("major: bleeding"), Severity::Moderate);
    }

    // ── Intake serialization ─────────────────────────────────────────────────

    #[test]
    fn empty_interactions_serialize_as_null() {
        let intake = make_intake(IntakeStatus::New, None);
        let value = serde_json::to_value(&intake).unwrap();
        assert!(value["drug_interactions"].is_null());
        assert_eq!(value["status"], json!("new"));
        assert_eq!(value["patient_name"], json!("Jane Roe"));
    }

    #[test]
    fn interactions_serialize_as_json_text() {
        let mut intake = make_intake(IntakeStatus::New, None);
        intake.record.drug_interactions = vec![warning()];

        let value = serde_json::to_value(&intake).unwrap();
        let text = value["drug_interactions"].as_str().expect("JSON text column");
        let decoded: Vec<InteractionWarning> = serde_json::from_str(text).unwrap();
        assert_eq!(decoded, vec![warning()]);

        let text_value: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(text_value[0]["severity"], json!("Major"));
        assert_eq!(text_value[0]["drug1"], json!("warfarin"));

        let restored: Intake = serde_json::from_value(value).unwrap();
        assert_eq!(restored, intake);
    }

    // ── IntakeFilter ─────────────────────────────────────────────────────────

    #[test]
    fn filter_applies_both_equalities() {
        let triage_alice = make_intake(IntakeStatus::Triage, Some("alice"));
        let triage_bob = make_intake(IntakeStatus::Triage, Some("bob"));
        let new_alice = make_intake(IntakeStatus::New, Some("alice"));

        assert!(IntakeFilter::default().matches(&triage_bob));

        let filter = IntakeFilter {
            status: Some(IntakeStatus::Triage),
            assigned_to: Some("alice".to_string()),
        };
        assert!(filter.matches(&triage_alice));
        assert!(!filter.matches(&triage_bob));
        assert!(!filter.matches(&new_alice));
    }

    // ── Statistics ───────────────────────────────────────────────────────────

    #[test]
    fn empty_statistics_are_zero_filled() {
        let stats = IntakeStatistics::empty();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.dispensed_count, 0);
        assert_eq!(stats.by_status.len(), 7);
        assert!(stats.by_status.values().all(|count| *count == 0));

        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["by_status"]["waiting_info"], json!(0));
    }

    // ── PharmError display messages ──────────────────────────────────────────

    #[test]
    fn error_invalid_transition_display() {
        let err = PharmError::InvalidTransition {
            from: IntakeStatus::Triage,
            to: IntakeStatus::Filled,
            allowed: vec![IntakeStatus::WaitingInfo, IntakeStatus::ReadyToFill],
        };
        let msg = err.to_string();
        assert!(msg.contains("from 'triage' to 'filled'"));
        assert!(msg.contains("'waiting_info', 'ready_to_fill'"));
    }

    #[test]
    fn error_invalid_transition_from_terminal_lists_nothing() {
        let err = PharmError::InvalidTransition {
            from: IntakeStatus::Completed,
            to: IntakeStatus::New,
            allowed: vec![],
        };
        assert!(err.to_string().ends_with("Allowed transitions: []"));
    }

    #[test]
    fn error_not_found_display() {
        let id = IntakeId::new();
        let err = PharmError::NotFound { id };
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn intake_id_parse_rejects_garbage() {
        assert!("42".parse::<IntakeId>().is_err());
        let id = IntakeId::new();
        assert_eq!(id.to_string().parse::<IntakeId>().unwrap(), id);
    }
}
