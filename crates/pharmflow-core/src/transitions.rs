//! The intake transition table.
//!
//! Transitions are data: a map from each status to the statuses it may move
//! to. Adding a state or an edge is an edit to `standard()`, not to the
//! workflow's control flow.

use std::collections::BTreeMap;

use pharmflow_contracts::{
    error::{PharmError, PharmResult},
    intake::IntakeStatus,
};

/// Adjacency table of allowed status changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    edges: BTreeMap<IntakeStatus, Vec<IntakeStatus>>,
}

impl TransitionTable {
    /// The pharmacy intake workflow:
    ///
    /// ```text
    /// new → triage → waiting_info → ready_to_fill → filled → dispensed → completed
    ///          └──────────────────────↗
    /// ```
    pub fn standard() -> Self {
        use IntakeStatus::*;

        Self::from_edges([
            (New, vec![Triage]),
            (Triage, vec![WaitingInfo, ReadyToFill]),
            (WaitingInfo, vec![ReadyToFill]),
            (ReadyToFill, vec![Filled]),
            (Filled, vec![Dispensed]),
            (Dispensed, vec![Completed]),
            (Completed, vec![]),
        ])
    }

    /// Build a table from explicit edges. Statuses not listed have no outgoing edges.
    pub fn from_edges(edges: impl IntoIterator<Item = (IntakeStatus, Vec<IntakeStatus>)>) -> Self {
        Self {
            edges: edges.into_iter().collect(),
        }
    }

    /// The statuses reachable from `from` in one step, in declaration order.
    pub fn allowed_from(&self, from: IntakeStatus) -> &[IntakeStatus] {
        self.edges.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_allowed(&self, from: IntakeStatus, to: IntakeStatus) -> bool {
        self.allowed_from(from).contains(&to)
    }

    /// Validate `from → to`, returning `InvalidTransition` with the allowed
    /// targets when the edge is not in the table.
    pub fn check(&self, from: IntakeStatus, to: IntakeStatus) -> PharmResult<()> {
        if self.is_allowed(from, to) {
            Ok(())
        } else {
            Err(PharmError::InvalidTransition {
                from,
                to,
                allowed: self.allowed_from(from).to_vec(),
            })
        }
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use IntakeStatus::*;

    #[test]
    fn every_status_has_an_entry() {
        let table = TransitionTable::standard();
        for status in IntakeStatus::ALL {
            assert!(table.edges.contains_key(&status), "missing row for {status}");
        }
    }

    #[test]
    fn only_declared_edges_are_allowed() {
        let table = TransitionTable::standard();
        let declared = [
            (New, Triage),
            (Triage, WaitingInfo),
            (Triage, ReadyToFill),
            (WaitingInfo, ReadyToFill),
            (ReadyToFill, Filled),
            (Filled, Dispensed),
            (Dispensed, Completed),
        ];

        for from in IntakeStatus::ALL {
            for to in IntakeStatus::ALL {
                let expected = declared.contains(&(from, to));
                assert_eq!(
                    table.is_allowed(from, to),
                    expected,
                    "edge {from} -> {to} should be allowed = {expected}"
                );
            }
        }
    }

    #[test]
    fn check_reports_allowed_targets() {
        let table = TransitionTable::standard();
        match table.check(Triage, Filled) {
            Err(PharmError::InvalidTransition { from, to, allowed }) => {
                assert_eq!(from, Triage);
                assert_eq!(to, Filled);
                assert_eq!(allowed, vec![WaitingInfo, ReadyToFill]);
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
    }

    #[test]
    fn no_backward_or_self_edges() {
        let table = TransitionTable::standard();
        for (i, from) in IntakeStatus::ALL.iter().enumerate() {
            for to in &IntakeStatus::ALL[..=i] {
                assert!(!table.is_allowed(*from, *to), "{from} -> {to} must be rejected");
            }
        }
    }

    #[test]
    fn completed_is_the_only_terminal_state() {
        let table = TransitionTable::standard();
        let terminal: Vec<_> = IntakeStatus::ALL
            .into_iter()
            .filter(|s| table.allowed_from(*s).is_empty())
            .collect();
        assert_eq!(terminal, vec![Completed]);
    }

    #[test]
    fn edges_are_additive() {
        let mut edges: Vec<_> = IntakeStatus::ALL
            .into_iter()
            .map(|s| (s, TransitionTable::standard().allowed_from(s).to_vec()))
            .collect();
        edges[0].1.push(WaitingInfo);

        let table = TransitionTable::from_edges(edges);
        assert!(table.is_allowed(New, WaitingInfo));
        assert!(table.is_allowed(New, Triage));
    }
}
