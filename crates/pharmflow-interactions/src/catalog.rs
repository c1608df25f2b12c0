//! The interaction catalog: a read-only, two-tier rule evaluator.
//!
//! Evaluation algorithm for a pair `(a, b)` of normalized names:
//!
//! 1. Run each `LookupStrategy` in order.
//! 2. `DirectPair` consults the directed entry `a → b`.
//! 3. `ReversePair` consults `b → a` (the catalog is not symmetric).
//! 4. `SharedCategory` walks the category rules in declaration order and
//!    fires for the first rule whose category holds both `a` and `b`, `a != b`.
//! 5. The first strategy that produces a description wins; its severity is
//!    derived from the description text.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use pharmflow_contracts::{
    error::{PharmError, PharmResult},
    interaction::Severity,
};

use crate::{checker::normalize_drug_name, knowledge::{CategoryRule, KnowledgeConfig}};

/// One way of finding an interaction between two drugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupStrategy {
    DirectPair,
    ReversePair,
    SharedCategory,
}

impl LookupStrategy {
    /// Direct entries beat reverse entries beat category rules.
    pub const DEFAULT_ORDER: [LookupStrategy; 3] = [
        LookupStrategy::DirectPair,
        LookupStrategy::ReversePair,
        LookupStrategy::SharedCategory,
    ];
}

/// A catalog hit for one drug pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMatch {
    pub severity: Severity,
    pub description: String,
    /// The strategy that produced the hit.
    pub strategy: LookupStrategy,
}

/// Pairwise interaction and category knowledge.
#[derive(Debug, Clone)]
pub struct InteractionCatalog {
    pairs: HashMap<String, HashMap<String, String>>,
    categories: BTreeMap<String, BTreeSet<String>>,
    category_rules: Vec<CategoryRule>,
    strategies: Vec<LookupStrategy>,
}

impl InteractionCatalog {
    /// Build a catalog from a knowledge-base config, normalizing every name.
    ///
    /// Returns `PharmError::ConfigError` if a category rule names a category
    /// that is not declared.
    pub fn from_config(config: &KnowledgeConfig) -> PharmResult<Self> {
        let pairs = config
            .interactions
            .iter()
            .map(|(drug, others)| {
                let others = others
                    .iter()
                    .map(|(other, description)| (normalize_drug_name(other), description.clone()))
                    .collect();
                (normalize_drug_name(drug), others)
            })
            .collect();

        let categories: BTreeMap<String, BTreeSet<String>> = config
            .categories
            .iter()
            .map(|(name, members)| {
                (name.clone(), members.iter().map(|m| normalize_drug_name(m)).collect())
            })
            .collect();

        for rule in &config.category_rules {
            if !categories.contains_key(&rule.category) {
                return Err(PharmError::ConfigError {
                    reason: format!(
                        "category rule references undeclared category '{}'",
                        rule.category
                    ),
                });
            }
        }

        Ok(Self {
            pairs,
            categories,
            category_rules: config.category_rules.clone(),
            strategies: LookupStrategy::DEFAULT_ORDER.to_vec(),
        })
    }

    /// Replace the strategy order. Strategies left out are never consulted.
    pub fn with_strategies(mut self, strategies: Vec<LookupStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Report the interaction between `drug_a` and `drug_b`, if any.
    pub fn find(&self, drug_a: &str, drug_b: &str) -> Option<CatalogMatch> {
        let a = normalize_drug_name(drug_a);
        let b = normalize_drug_name(drug_b);

        for strategy in &self.strategies {
            let description = match strategy {
                LookupStrategy::DirectPair => self.directed(&a, &b),
                LookupStrategy::ReversePair => self.directed(&b, &a),
                LookupStrategy::SharedCategory => self.shared_category(&a, &b),
            };

            if let Some(description) = description {
                debug!(drug_a = %a, drug_b = %b, strategy = ?strategy, "interaction found");
                return Some(CatalogMatch {
                    severity: Severity::from_description(description),
                    description: description.to_string(),
                    strategy: *strategy,
                });
            }
        }

        None
    }

    /// The directed entry `from → to`.
    fn directed(&self, from: &str, to: &str) -> Option<&str> {
        self.pairs
            .get(from)
            .and_then(|others| others.get(to))
            .map(String::as_str)
    }

    fn shared_category(&self, a: &str, b: &str) -> Option<&str> {
        if a == b {
            return None;
        }
        self.category_rules
            .iter()
            .find(|rule| {
                self.categories
                    .get(&rule.category)
                    .is_some_and(|members| members.contains(a) && members.contains(b))
            })
            .map(|rule| rule.description.as_str())
    }

    /// Names of the categories `drug` belongs to.
    pub fn categories_of(&self, drug: &str) -> Vec<&str> {
        let drug = normalize_drug_name(drug);
        self.categories
            .iter()
            .filter(|(_, members)| members.contains(&drug))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Number of directed pair entries.
    pub fn pair_count(&self) -> usize {
        self.pairs.values().map(HashMap::len).sum()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}
