//! Drug interaction warning types.
//!
//! Warnings are derived data: the interaction checker produces them, the
//! counseling generator renders them, and the intake record stores them as
//! JSON text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Clinical weight of an interaction warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Major,
    Moderate,
}

impl Severity {
    /// The marker a description carries to be classified as major.
    pub const MAJOR_MARKER: &'static str = "Major:";

    /// Classify a catalog description. Anything without the major marker is moderate.
    pub fn from_description(description: &str) -> Self {
        if description.contains(Self::MAJOR_MARKER) {
            Severity::Major
        } else {
            Severity::Moderate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Major => "Major",
            Severity::Moderate => "Moderate",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flagged drug pair.
///
/// `drug1` and `drug2` are normalized (trimmed, lower-cased) names in the
/// order the checker compared them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionWarning {
    pub drug1: String,
    pub drug2: String,
    pub severity: Severity,
    pub description: String,
}

/// The result of re-checking an intake's medications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionReport {
    pub interactions: Vec<InteractionWarning>,
    pub counseling_points: String,
}

/// Serde adapter storing a warning list as a nullable JSON text column.
///
/// An empty list serializes as `null`; `null`, a missing field, or an empty
/// string deserialize as an empty list.
pub mod interactions_column {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};

    use super::InteractionWarning;

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S>(warnings: &Vec<InteractionWarning>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if warnings.is_empty() {
            return serializer.serialize_none();
        }
        let text = serde_json::to_string(warnings).map_err(ser::Error::custom)?;
        serializer.serialize_some(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<InteractionWarning>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) if !text.trim().is_empty() => {
                serde_json::from_str(&text).map_err(de::Error::custom)
            }
            _ => Ok(Vec::new()),
        }
    }
}
