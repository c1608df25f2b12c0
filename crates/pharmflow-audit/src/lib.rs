//! # pharmflow-audit
//!
//! Append-only, SHA-256 hash-chained activity trail for PHARMFLOW intakes.
//!
//! Every `ActivityEntry` the workflow records becomes an `ActivityEvent`
//! linked both to the previous event of the trail and to the previous event
//! of the same intake. `verify_chain` checks the whole trail;
//! `verify_history` checks one intake's history on its own.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharmflow_audit::InMemoryActivityLog;
//!
//! let log = InMemoryActivityLog::new("counter-1");
//! let workflow = IntakeWorkflow::new(store, Box::new(log.clone()), knowledge);
//! // ...
//! assert!(log.verify_integrity()?);
//! assert!(log.verify_intake(intake_id)?);
//! let history = log.entries_for(intake_id)?;
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain, verify_history};
pub use event::{ActivityEvent, ActivityTrail};
pub use memory::InMemoryActivityLog;

// ── Tests ─────────────────────────────────────────────────────────────────────
