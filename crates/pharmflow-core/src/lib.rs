//! # pharmflow-core
//!
//! The intake workflow for PHARMFLOW.
//!
//! This crate provides:
//! - The two collaborator traits (`IntakeStore`, `ActivityWriter`)
//! - The `TransitionTable` that decides which status changes are legal
//! - The `IntakeWorkflow` that wires them to the interaction checker and
//!   counseling generator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharmflow_core::{IntakeWorkflow, traits::{IntakeStore, ActivityWriter}};
//! ```

pub mod traits;
pub mod transitions;
pub mod workflow;

pub use transitions::TransitionTable;
pub use workflow::IntakeWorkflow;
