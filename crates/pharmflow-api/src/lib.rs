//! # pharmflow-api
//!
//! Transport-agnostic request dispatch for the PHARMFLOW intake workflow.
//!
//! `IntakeApi::handle` takes one `ApiRequest` and returns one `ApiResponse`
//! carrying an HTTP status code and a JSON body. Request bodies pass through
//! JSON Schema validation before they are deserialized; workflow errors are
//! mapped onto status codes in one place (`error_response`).
//!
//! | Outcome                                  | Status |
//! |------------------------------------------|--------|
//! | success                                  | 200    |
//! | unknown or unparseable intake id         | 404    |
//! | rejected transition, invalid input value | 400    |
//! | request body fails its schema            | 422    |
//! | anything else                            | 500    |

pub mod schema;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use pharmflow_contracts::{
    error::{PharmError, PharmResult},
    intake::{IntakeFilter, IntakeId, IntakeStatus, NewIntake},
};
use pharmflow_core::IntakeWorkflow;

use crate::schema::{BodyKind, RequestSchemas};

/// One request against the intake API. Ids arrive as raw path strings.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    Health,
    CreateIntake { body: Value },
    ListIntakes {
        status: Option<String>,
        assigned_to: Option<String>,
    },
    GetIntake { id: String },
    ChangeStatus { id: String, body: Value },
    Assign { id: String, body: Value },
    UpdateCounseling { id: String, body: Value },
    UpdatePharmacistNotes { id: String, body: Value },
    Dispense { id: String, body: Value },
    CheckInteractions { id: String },
    Statistics,
}

impl ApiRequest {
    /// A short route-like label for logs.
    pub fn route(&self) -> &'static str {
        match self {
            ApiRequest::Health => "GET /",
            ApiRequest::CreateIntake { .. } => "POST /intakes",
            ApiRequest::ListIntakes { .. } => "GET /intakes",
            ApiRequest::GetIntake { .. } => "GET /intakes/{id}",
            ApiRequest::ChangeStatus { .. } => "POST /intakes/{id}/status",
            ApiRequest::Assign { .. } => "POST /intakes/{id}/assign",
            ApiRequest::UpdateCounseling { .. } => "POST /intakes/{id}/counseling",
            ApiRequest::UpdatePharmacistNotes { .. } => "POST /intakes/{id}/pharmacist-notes",
            ApiRequest::Dispense { .. } => "POST /intakes/{id}/dispense",
            ApiRequest::CheckInteractions { .. } => "GET /intakes/{id}/check-interactions",
            ApiRequest::Statistics => "GET /intakes/stats/summary",
        }
    }
}

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn detail(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "detail": detail.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ── Typed bodies ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatusBody {
    status: IntakeStatus,
}

#[derive(Deserialize)]
struct AssignBody {
    user: String,
}

#[derive(Deserialize)]
struct CounselingBody {
    counseling_points: String,
}

#[derive(Deserialize)]
struct PharmacistNotesBody {
    pharmacist_notes: String,
}

#[derive(Deserialize)]
struct DispenseBody {
    dispensed: String,
}

/// Why a request failed before or inside the workflow.
enum Rejection {
    /// The body did not satisfy its schema.
    Schema(Vec<String>),
    /// The path id is not a valid intake id.
    UnknownId,
    /// The result could not be rendered as JSON.
    Render(String),
    Workflow(PharmError),
}

impl From<PharmError> for Rejection {
    fn from(e: PharmError) -> Self {
        Rejection::Workflow(e)
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// The request dispatcher. Owns the workflow and the compiled body schemas.
pub struct IntakeApi {
    workflow: IntakeWorkflow,
    schemas: RequestSchemas,
}

impl IntakeApi {
    pub fn new(workflow: IntakeWorkflow) -> PharmResult<Self> {
        Ok(Self {
            workflow,
            schemas: RequestSchemas::compile()?,
        })
    }

    pub fn workflow(&self) -> &IntakeWorkflow {
        &self.workflow
    }

    /// Handle one request. Never panics on bad input; every failure becomes
    /// an error response.
    pub fn handle(&self, request: ApiRequest) -> ApiResponse {
        let route = request.route();
        debug!(route, "handling request");

        match self.dispatch(request) {
            Ok(body) => ApiResponse::ok(body),
            Err(rejection) => {
                let response = Self::error_response(route, rejection);
                warn!(route, status = response.status, body = %response.body, "request failed");
                response
            }
        }
    }

    fn dispatch(&self, request: ApiRequest) -> Result<Value, Rejection> {
        match request {
            ApiRequest::Health => Ok(json!({
                "status": "ok",
                "message": "Pharmacy Workflow API is running",
            })),

            ApiRequest::CreateIntake { body } => {
                let data: NewIntake = self.parse_body(BodyKind::CreateIntake, body)?;
                to_json(&self.workflow.create(data)?)
            }

            ApiRequest::ListIntakes {
                status,
                assigned_to,
            } => {
                // An unknown status is an equality filter that matches nothing.
                let status = match status.as_deref().map(str::parse::<IntakeStatus>) {
                    None => None,
                    Some(Ok(status)) => Some(status),
                    Some(Err(_)) => return Ok(json!([])),
                };
                let filter = IntakeFilter {
                    status,
                    assigned_to,
                };
                to_json(&self.workflow.list(&filter)?)
            }

            ApiRequest::GetIntake { id } => to_json(&self.workflow.get(parse_id(&id)?)?),

            ApiRequest::ChangeStatus { id, body } => {
                let id = parse_id(&id)?;
                let body: StatusBody = self.parse_body(BodyKind::StatusUpdate, body)?;
                to_json(&self.workflow.update_status(id, body.status)?)
            }

            ApiRequest::Assign { id, body } => {
                let id = parse_id(&id)?;
                let body: AssignBody = self.parse_body(BodyKind::Assign, body)?;
                to_json(&self.workflow.assign(id, body.user)?)
            }

            ApiRequest::UpdateCounseling { id, body } => {
                let id = parse_id(&id)?;
                let body: CounselingBody = self.parse_body(BodyKind::Counseling, body)?;
                to_json(&self.workflow.update_counseling_points(id, body.counseling_points)?)
            }

            ApiRequest::UpdatePharmacistNotes { id, body } => {
                let id = parse_id(&id)?;
                let body: PharmacistNotesBody = self.parse_body(BodyKind::PharmacistNotes, body)?;
                to_json(&self.workflow.update_pharmacist_notes(id, body.pharmacist_notes)?)
            }

            ApiRequest::Dispense { id, body } => {
                let id = parse_id(&id)?;
                let body: DispenseBody = self.parse_body(BodyKind::Dispense, body)?;
                to_json(&self.workflow.dispense(id, &body.dispensed)?)
            }

            ApiRequest::CheckInteractions { id } => {
                to_json(&self.workflow.recheck_interactions(parse_id(&id)?)?)
            }

            ApiRequest::Statistics => to_json(&self.workflow.statistics()?),
        }
    }

    fn parse_body<T: DeserializeOwned>(&self, kind: BodyKind, body: Value) -> Result<T, Rejection> {
        self.schemas.validate(kind, &body).map_err(Rejection::Schema)?;
        serde_json::from_value(body).map_err(|e| Rejection::Schema(vec![e.to_string()]))
    }

    fn error_response(route: &str, rejection: Rejection) -> ApiResponse {
        match rejection {
            Rejection::Schema(violations) => ApiResponse {
                status: 422,
                body: json!({ "detail": violations }),
            },
            Rejection::UnknownId | Rejection::Workflow(PharmError::NotFound { .. }) => {
                ApiResponse::detail(404, "Intake not found")
            }
            Rejection::Workflow(
                e @ (PharmError::InvalidTransition { .. } | PharmError::InvalidInput { .. }),
            ) => ApiResponse::detail(400, e.to_string()),
            Rejection::Render(reason) => {
                ApiResponse::detail(500, format!("Error rendering {route}: {reason}"))
            }
            Rejection::Workflow(e) => {
                ApiResponse::detail(500, format!("Error handling {route}: {e}"))
            }
        }
    }
}

fn parse_id(raw: &str) -> Result<IntakeId, Rejection> {
    raw.parse().map_err(|_| Rejection::UnknownId)
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, Rejection> {
    serde_json::to_value(value).map_err(|e| Rejection::Render(e.to_string()))
}
