//! Knowledge-base configuration schema and loader.
//!
//! A `KnowledgeConfig` is deserialized from TOML and holds everything the
//! rules engine knows: directed interaction pairs, drug categories, category
//! rules, and counseling blocks. `KnowledgeBase` turns a validated config into
//! a ready-to-use checker and counseling generator.
//!
//! Example:
//! ```toml
//! [interactions.warfarin]
//! aspirin = "Major: Increased bleeding risk. Monitor INR closely."
//!
//! [categories]
//! nsaids = ["ibuprofen", "naproxen"]
//!
//! [[category_rules]]
//! category = "nsaids"
//! description = "Moderate: Multiple NSAIDs may increase GI bleeding risk."
//!
//! [fallback]
//! lines = ["• Take medication as directed by your healthcare provider"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use pharmflow_contracts::error::{PharmError, PharmResult};

use crate::{catalog::InteractionCatalog, checker::InteractionChecker, counseling::CounselingGenerator};

/// The built-in knowledge base shipped with the crate.
const BUILTIN_KNOWLEDGE: &str = include_str!("../knowledge/default.toml");

/// An interaction inferred from two distinct drugs sharing `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Key into `KnowledgeConfig::categories`.
    pub category: String,
    /// Reported description; severity is derived from it like any other entry.
    pub description: String,
}

/// A canned counseling block selected by keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounselingBlock {
    /// Stable identifier used in logs and tests.
    pub id: String,
    /// Substrings that select this block (matched case-insensitively).
    pub triggers: Vec<String>,
    /// Bullet lines emitted, in order, when the block is selected.
    pub lines: Vec<String>,
}

/// Lines emitted when no block matched and no interactions were found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackBlock {
    pub lines: Vec<String>,
}

/// The top-level structure deserialized from a knowledge-base TOML document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// drug → (other drug → description). Directed; lookups try both ways.
    #[serde(default)]
    pub interactions: BTreeMap<String, BTreeMap<String, String>>,

    /// category name → member drugs.
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,

    /// Evaluated in declaration order after the direct and reverse lookups.
    #[serde(default)]
    pub category_rules: Vec<CategoryRule>,

    /// Evaluated in declaration order; every matching block is emitted.
    #[serde(default)]
    pub counseling: Vec<CounselingBlock>,

    pub fallback: FallbackBlock,
}

/// A loaded knowledge base: the interaction checker and the counseling
/// generator built from one `KnowledgeConfig`.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    pub checker: InteractionChecker,
    pub counseling: CounselingGenerator,
}

impl KnowledgeBase {
    /// Load the knowledge base embedded in the crate.
    pub fn builtin() -> PharmResult<Self> {
        Self::from_toml_str(BUILTIN_KNOWLEDGE)
    }

    /// Parse `s` as TOML and build a `KnowledgeBase`.
    ///
    /// Returns `PharmError::ConfigError` if the TOML is malformed, does not
    /// match `KnowledgeConfig`, or references an undeclared category.
    pub fn from_toml_str(s: &str) -> PharmResult<Self> {
        let config: KnowledgeConfig = toml::from_str(s).map_err(|e| PharmError::ConfigError {
            reason: format!("failed to parse knowledge base TOML: {}", e),
        })?;
        Self::from_config(&config)
    }

    /// Read the file at `path` and parse it as a knowledge-base document.
    pub fn from_file(path: &Path) -> PharmResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| PharmError::ConfigError {
            reason: format!("failed to read knowledge base '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_config(config: &KnowledgeConfig) -> PharmResult<Self> {
        let catalog = InteractionCatalog::from_config(config)?;
        let counseling = CounselingGenerator::from_config(config);

        debug!(
            pairs = catalog.pair_count(),
            categories = catalog.category_count(),
            counseling_blocks = counseling.block_count(),
            "knowledge base loaded"
        );

        Ok(Self {
            checker: InteractionChecker::new(catalog),
            counseling,
        })
    }
}
