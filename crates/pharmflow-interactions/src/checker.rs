//! Medication-list parsing and pairwise interaction checking.

use tracing::debug;

use pharmflow_contracts::interaction::InteractionWarning;

use crate::catalog::InteractionCatalog;

/// Normalize a drug name for comparison: trimmed and lower-cased.
pub fn normalize_drug_name(drug: &str) -> String {
    drug.trim().to_lowercase()
}

/// Split a free-text medication list on `,`, `;`, or newline.
///
/// Fragments are normalized; empty fragments are dropped. Duplicates and
/// source order are kept.
pub fn parse_medication_list(text: &str) -> Vec<String> {
    text.split([',', ';', '\n'])
        .map(normalize_drug_name)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Produces interaction warnings for an intake's medication lists.
#[derive(Debug, Clone)]
pub struct InteractionChecker {
    catalog: InteractionCatalog,
}

impl InteractionChecker {
    pub fn new(catalog: InteractionCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &InteractionCatalog {
        &self.catalog
    }

    /// Check `new_medications`, either against themselves or against
    /// `current_medications`.
    ///
    /// - `current_medications` absent or `""`: every pair `(i, j)`, `i < j`,
    ///   of the new list, in ascending index order.
    /// - otherwise: every `(new, current)` pair, new list outer, current list
    ///   inner. Pairs within the current list are not checked.
    ///
    /// Warnings come back in iteration order, undeduplicated.
    pub fn check(
        &self,
        new_medications: &str,
        current_medications: Option<&str>,
    ) -> Vec<InteractionWarning> {
        let new_meds = parse_medication_list(new_medications);
        let current_meds = match current_medications {
            Some(current) if !current.is_empty() => Some(parse_medication_list(current)),
            _ => None,
        };

        let pairs: Vec<(&String, &String)> = match &current_meds {
            Some(current_meds) => new_meds
                .iter()
                .flat_map(|new_med| current_meds.iter().map(move |current| (new_med, current)))
                .collect(),
            None => {
                let meds = &new_meds;
                meds.iter()
                    .enumerate()
                    .flat_map(move |(i, first)| meds[i + 1..].iter().map(move |second| (first, second)))
                    .collect()
            }
        };

        self.warn_for(pairs)
    }

    fn warn_for(&self, pairs: Vec<(&String, &String)>) -> Vec<InteractionWarning> {
        let compared = pairs.len();
        let warnings: Vec<InteractionWarning> = pairs
            .into_iter()
            .filter_map(|(drug1, drug2)| {
                self.catalog.find(drug1, drug2).map(|hit| InteractionWarning {
                    drug1: drug1.clone(),
                    drug2: drug2.clone(),
                    severity: hit.severity,
                    description: hit.description,
                })
            })
            .collect();

        debug!(
            pairs_compared = compared,
            warnings = warnings.len(),
            "interaction check complete"
        );
        warnings
    }
}
