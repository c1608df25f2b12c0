//! Patient counseling text generation.
//!
//! Output layout, top to bottom:
//!
//! 1. every keyword block whose triggers appear in the medications text, in
//!    knowledge-base order;
//! 2. the interaction warning header and one line per warning, in input order;
//! 3. the fallback block, only when neither 1 nor 2 produced anything.

use tracing::debug;

use pharmflow_contracts::interaction::InteractionWarning;

use crate::knowledge::{CounselingBlock, KnowledgeConfig};

/// Header line preceding the per-interaction lines.
pub const INTERACTION_WARNING_HEADER: &str = "\n⚠️ DRUG INTERACTION WARNINGS:";

#[derive(Debug, Clone)]
pub struct CounselingGenerator {
    blocks: Vec<CounselingBlock>,
    fallback: Vec<String>,
}

impl CounselingGenerator {
    pub fn from_config(config: &KnowledgeConfig) -> Self {
        let blocks = config
            .counseling
            .iter()
            .map(|block| CounselingBlock {
                triggers: block.triggers.iter().map(|t| t.to_lowercase()).collect(),
                ..block.clone()
            })
            .collect();

        Self {
            blocks,
            fallback: config.fallback.lines.clone(),
        }
    }

    /// Ids of the keyword blocks `medications` selects, in emission order.
    pub fn matched_blocks(&self, medications: &str) -> Vec<&str> {
        self.selected(medications)
            .map(|block| block.id.as_str())
            .collect()
    }

    /// Blocks with a trigger contained in the lower-cased `medications`.
    fn selected<'a>(&'a self, medications: &str) -> impl Iterator<Item = &'a CounselingBlock> {
        let meds_lower = medications.to_lowercase();
        self.blocks
            .iter()
            .filter(move |block| block.triggers.iter().any(|t| meds_lower.contains(t.as_str())))
    }

    /// Render counseling text for `medications` and its interaction warnings.
    ///
    /// Matching runs on the raw text, so "Atorvastatin 20mg" still selects the
    /// statin block.
    pub fn generate(&self, medications: &str, interactions: &[InteractionWarning]) -> String {
        let mut points: Vec<String> = self
            .selected(medications)
            .flat_map(|block| block.lines.iter().cloned())
            .collect();

        if !interactions.is_empty() {
            points.push(INTERACTION_WARNING_HEADER.to_string());
            points.extend(interactions.iter().map(|i| {
                format!("• {} + {}: {}", i.drug1, i.drug2, i.description)
            }));
        }

        if points.is_empty() {
            points.extend(self.fallback.iter().cloned());
        }

        debug!(lines = points.len(), "counseling points generated");
        points.join("\n")
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use pharmflow_contracts::interaction::Severity;

    use super::*;
    use crate::knowledge::KnowledgeBase;

    fn generator() -> CounselingGenerator {
        KnowledgeBase::builtin().unwrap().counseling
    }

    fn warning(drug1: &str, drug2: &str, description: &str) -> InteractionWarning {
        InteractionWarning {
            drug1: drug1.to_string(),
            drug2: drug2.to_string(),
            severity: Severity::from_description(description),
            description: description.to_string(),
        }
    }

    #[test]
    fn warfarin_block_then_interaction_lines() {
        let interactions = vec![warning(
            "warfarin",
            "aspirin",
            "Major: Increased bleeding risk. Monitor INR closely.",
        )];
        let text = generator().generate("warfarin, aspirin", &interactions);

        let block_at = text.find("Regular INR monitoring required").unwrap();
        let header_at = text.find("DRUG INTERACTION WARNINGS").unwrap();
        let line_at = text
            .find("• warfarin + aspirin: Major: Increased bleeding risk.")
            .unwrap();
        assert!(block_at < header_at && header_at < line_at);
        assert!(!text.contains("Take medication as directed"));
    }

    #[test]
    fn blocks_are_additive_in_knowledge_base_order() {
        let generator = generator();
        assert_eq!(
            generator.matched_blocks("Lisinopril\nAmoxicillin; Warfarin, atorvastatin"),
            vec!["warfarin", "antibiotic", "statin", "ace-inhibitor"]
        );

        let text = generator.generate("lisinopril, warfarin", &[]);
        let warfarin_at = text.find("Take at the same time each day").unwrap();
        let ace_at = text.find("May cause dry cough").unwrap();
        assert!(warfarin_at < ace_at);
    }

    #[test]
    fn generic_keywords_select_blocks() {
        let generator = generator();
        assert_eq!(generator.matched_blocks("some antibiotic"), vec!["antibiotic"]);
        assert_eq!(generator.matched_blocks("a STATIN"), vec!["statin"]);
        // Plain substring match: "acetaminophen" contains "ace".
        assert_eq!(generator.matched_blocks("acetaminophen"), vec!["ace-inhibitor"]);
    }

    #[test]
    fn fallback_only_when_nothing_else_applies() {
        let text = generator().generate("metformin", &[]);
        assert_eq!(
            text,
            "• Take medication as directed by your healthcare provider\n\
             • Do not stop taking without consulting your doctor\n\
             • Store medications in a cool, dry place"
        );
    }

    #[test]
    fn interactions_alone_suppress_fallback() {
        let interactions = vec![warning(
            "ibuprofen",
            "naproxen",
            "Moderate: Multiple NSAIDs may increase GI bleeding risk.",
        )];
        let text = generator().generate("ibuprofen", &interactions);
        assert!(text.starts_with(INTERACTION_WARNING_HEADER));
        assert!(text.ends_with("• ibuprofen + naproxen: Moderate: Multiple NSAIDs may increase GI bleeding risk."));
        assert!(!text.contains("cool, dry place"));
    }

    #[test]
    fn interaction_lines_keep_input_order() {
        let interactions = vec![
            warning("b", "c", "Moderate: second"),
            warning("a", "d", "Major: first"),
        ];
        let text = generator().generate("metformin", &interactions);
        assert!(text.find("• b + c").unwrap() < text.find("• a + d").unwrap());
    }

    #[test]
    fn generated_text_covers_exactly_the_matched_blocks() {
        let generator = generator();
        let config: KnowledgeConfig =
            toml::from_str(include_str!("../knowledge/default.toml")).unwrap();
        let inputs = ["warfarin", "Atorvastatin 20mg; amoxicillin", "acetaminophen", "metformin"];

        for meds in inputs {
            let matched = generator.matched_blocks(meds);
            let text = generator.generate(meds, &[]);
            for block in &config.counseling {
                let first_line = block.lines[0].as_str();
                assert_eq!(
                    text.contains(first_line),
                    matched.contains(&block.id.as_str()),
                    "block '{}' for {meds:?}",
                    block.id
                );
            }
        }
    }
}
