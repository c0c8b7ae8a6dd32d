//! Structural invariants of a completed report.

use std::collections::HashSet;

use proptest::prelude::*;
use proptest::test_runner::{TestCaseError, TestCaseResult};

use crate::{
    graph::GraphProvider,
    search::ExecutionStrategy,
    test_utils::Fixture,
};

use super::{equivalence::run_case, types::SearchCase};

/// Every reported clique is a clique of the graph within the size bound,
/// its support meets the threshold and matches a recount, and the report is
/// best-first, duplicate free and within capacity.
pub(super) fn run_structural_invariants_property(case: &SearchCase) -> TestCaseResult {
    let fixture = Fixture::new(&case.sample);
    let report = run_case(case, &fixture, ExecutionStrategy::Sequential)?;
    let found = fixture.flatten(&report);

    prop_assert!(report.termination().is_complete());
    prop_assert!(found.len() <= case.capacity);

    let mut seen = HashSet::new();
    for (members, outcomes, support) in &found {
        prop_assert!(!members.is_empty() && members.len() <= case.size_bound);
        prop_assert!(*support >= case.min_support.max(1));
        prop_assert!(outcomes <= support);
        prop_assert!(seen.insert(members.clone()), "duplicate clique {members:?}");
        prop_assert!(case.fixed.iter().all(|node| members.contains(node)));
        prop_assert!(members.len() > case.fixed.len());

        for (position, &left) in members.iter().enumerate() {
            for &right in &members[position + 1..] {
                let adjacent = fixture
                    .graph
                    .are_adjacent(left, right)
                    .map_err(|error| TestCaseError::fail(error.to_string()))?;
                prop_assert!(adjacent, "{left} and {right} are not adjacent");
            }
        }

        let recount: Vec<usize> = (0..case.sample.patients.len())
            .filter(|&patient| {
                members
                    .iter()
                    .all(|member| case.sample.patients[patient].contains(member))
            })
            .collect();
        prop_assert_eq!(recount.len(), *support);
        prop_assert_eq!(
            recount
                .iter()
                .filter(|&&patient| case.sample.is_flagged(patient))
                .count(),
            *outcomes
        );
    }

    for pair in report.cliques().windows(2) {
        prop_assert!(pair[0].score() >= pair[1].score());
    }
    Ok(())
}
