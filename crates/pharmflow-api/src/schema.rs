//! JSON Schemas for request bodies.
//!
//! Each body is validated structurally before it is deserialized, so a
//! malformed request is reported with every violation at once instead of
//! the first serde error.

use jsonschema::Validator;
use serde_json::{json, Value};
use tracing::warn;

use pharmflow_contracts::{
    error::{PharmError, PharmResult},
    intake::IntakeStatus,
};

/// The request bodies that carry a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    CreateIntake,
    StatusUpdate,
    Assign,
    Counseling,
    PharmacistNotes,
    Dispense,
}

impl BodyKind {
    pub const ALL: [BodyKind; 6] = [
        BodyKind::CreateIntake,
        BodyKind::StatusUpdate,
        BodyKind::Assign,
        BodyKind::Counseling,
        BodyKind::PharmacistNotes,
        BodyKind::Dispense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyKind::CreateIntake => "create-intake",
            BodyKind::StatusUpdate => "status-update",
            BodyKind::Assign => "assign",
            BodyKind::Counseling => "counseling",
            BodyKind::PharmacistNotes => "pharmacist-notes",
            BodyKind::Dispense => "dispense",
        }
    }

    /// The JSON Schema document for this body.
    pub fn schema(&self) -> Value {
        match self {
            BodyKind::CreateIntake => json!({
                "type": "object",
                "required": ["patient_name", "medications"],
                "properties": {
                    "patient_name": { "type": "string" },
                    "patient_age": { "type": ["integer", "null"], "minimum": 0 },
                    "patient_allergies": { "type": ["string", "null"] },
                    "medications": { "type": "string" },
                    "current_medications": { "type": ["string", "null"] },
                    "notes": { "type": ["string", "null"] }
                }
            }),
            BodyKind::StatusUpdate => {
                let statuses: Vec<&str> = IntakeStatus::ALL.iter().map(|s| s.as_str()).collect();
                json!({
                    "type": "object",
                    "required": ["status"],
                    "properties": {
                        "status": { "type": "string", "enum": statuses }
                    }
                })
            }
            BodyKind::Assign => single_string_field("user"),
            BodyKind::Counseling => single_string_field("counseling_points"),
            BodyKind::PharmacistNotes => single_string_field("pharmacist_notes"),
            BodyKind::Dispense => single_string_field("dispensed"),
        }
    }
}

fn single_string_field(name: &str) -> Value {
    json!({
        "type": "object",
        "required": [name],
        "properties": {
            name: { "type": "string" }
        }
    })
}

/// Compiled validators for every `BodyKind`.
pub struct RequestSchemas {
    validators: Vec<(BodyKind, Validator)>,
}

impl RequestSchemas {
    /// Compile every body schema.
    pub fn compile() -> PharmResult<Self> {
        let mut validators = Vec::with_capacity(BodyKind::ALL.len());
        for kind in BodyKind::ALL {
            let validator = jsonschema::validator_for(&kind.schema()).map_err(|e| {
                PharmError::SchemaValidation {
                    reason: format!("invalid '{}' schema: {e}", kind.as_str()),
                }
            })?;
            validators.push((kind, validator));
        }
        Ok(Self { validators })
    }

    /// Validate `body` as `kind`, returning every violation on failure.
    pub fn validate(&self, kind: BodyKind, body: &Value) -> Result<(), Vec<String>> {
        let Some((_, validator)) = self.validators.iter().find(|(k, _)| *k == kind) else {
            return Err(vec![format!("no schema registered for '{}'", kind.as_str())]);
        };

        let violations: Vec<String> = validator
            .iter_errors(body)
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{path}: {error}")
                }
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            warn!(body = kind.as_str(), violations = violations.len(), "request body rejected");
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schemas() -> RequestSchemas {
        RequestSchemas::compile().unwrap()
    }

    #[test]
    fn all_schemas_compile() {
        assert_eq!(schemas().validators.len(), BodyKind::ALL.len());
    }

    #[test]
    fn create_requires_name_and_medications() {
        let schemas = schemas();
        let ok = json!({ "patient_name": "A", "medications": "warfarin", "patient_age": null });
        assert!(schemas.validate(BodyKind::CreateIntake, &ok).is_ok());

        let violations = schemas
            .validate(BodyKind::CreateIntake, &json!({ "patient_age": -3 }))
            .unwrap_err();
        assert_eq!(violations.len(), 3, "{violations:?}");
    }

    #[test]
    fn status_must_be_a_known_state() {
        let schemas = schemas();
        assert!(schemas
            .validate(BodyKind::StatusUpdate, &json!({ "status": "ready_to_fill" }))
            .is_ok());
        assert!(schemas
            .validate(BodyKind::StatusUpdate, &json!({ "status": "shipped" }))
            .is_err());
    }

    #[test]
    fn single_field_bodies() {
        let schemas = schemas();
        assert!(schemas.validate(BodyKind::Dispense, &json!({ "dispensed": "maybe" })).is_ok());
        assert!(schemas.validate(BodyKind::Dispense, &json!({ "dispensed": true })).is_err());
        assert!(schemas.validate(BodyKind::Assign, &json!({})).is_err());
        assert!(schemas.validate(BodyKind::Counseling, &json!("text")).is_err());
    }
}
