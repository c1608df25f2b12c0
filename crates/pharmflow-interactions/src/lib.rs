//! # pharmflow-interactions
//!
//! A TOML-driven drug interaction and counseling rules engine.
//!
//! ## Overview
//!
//! [`KnowledgeBase`] loads a knowledge-base document (the embedded default, a
//! string, or a file) and builds:
//!
//! - an [`InteractionChecker`] over an [`InteractionCatalog`] of directed drug
//!   pairs and category rules;
//! - a [`CounselingGenerator`] of keyword-selected counseling blocks.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use pharmflow_interactions::KnowledgeBase;
//!
//! let kb = KnowledgeBase::builtin()?;
//! let warnings = kb.checker.check("warfarin, aspirin", None);
//! let text = kb.counseling.generate("warfarin, aspirin", &warnings);
//! ```

pub mod catalog;
pub mod checker;
pub mod counseling;
pub mod knowledge;

pub use catalog::{CatalogMatch, InteractionCatalog, LookupStrategy};
pub use checker::{normalize_drug_name, parse_medication_list, InteractionChecker};
pub use counseling::CounselingGenerator;
pub use knowledge::{CategoryRule, CounselingBlock, KnowledgeBase, KnowledgeConfig};

// ── Tests ─────────────────────────────────────────────────────────────────────
