use rstest::{fixture, rstest};

use super::*;
use crate::{
    error::SearchErrorCode,
    graph::ComorbidityGraph,
    result::Termination,
    test_utils::{Fixture, Flat, Sample, brute_force, disease, patient_id},
};

fn search(size_bound: usize, min_support: usize, capacity: usize) -> CliqueSearchBuilder {
    CliqueSearch::builder()
        .with_size_bound(size_bound)
        .with_min_support(min_support)
        .with_capacity(capacity)
        .with_execution_strategy(ExecutionStrategy::Sequential)
}

fn run(builder: CliqueSearchBuilder, fixture: &Fixture) -> SearchReport {
    builder
        .build()
        .expect("configuration is valid")
        .run(&fixture.graph, &fixture.index, &fixture.outcomes)
        .expect("search succeeds")
}

/// Four mutually adjacent diseases. Diseases 0 and 1 share patients 0, 1
/// and 2, of whom 0 and 1 are flagged.
#[fixture]
fn complete_four() -> Sample {
    Sample {
        node_count: 4,
        edges: vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)],
        patients: vec![
            vec![0, 1],
            vec![0, 1, 2],
            vec![0, 1, 3],
            vec![2, 3],
            vec![3],
            vec![],
        ],
        flagged: vec![true, true, false, false, true, true],
    }
}

/// Triangle 0-1-2 plus a pendant 3 attached to 2, every patient carrying
/// every disease.
#[fixture]
fn saturated_paw() -> Sample {
    Sample {
        node_count: 4,
        edges: vec![(0, 1), (0, 2), (1, 2), (2, 3)],
        patients: vec![vec![0, 1, 2, 3]; 3],
        flagged: vec![true, false, false],
    }
}

#[rstest]
fn shared_support_is_scored_by_outcome_density(complete_four: Sample) {
    let fixture = Fixture::new(&complete_four);
    let report = run(search(2, 2, 100), &fixture);
    let found = fixture.flatten(&report);
    assert!(found.contains(&(vec![0, 1], 2, 3)));
    assert_eq!(found, brute_force(&complete_four, 2, 2, 100, &[]));
    assert!(report.termination().is_complete());
}

#[rstest]
fn unit_size_bound_scores_each_disease_alone(complete_four: Sample) {
    let fixture = Fixture::new(&complete_four);
    let report = run(search(1, 1, 100), &fixture);
    let found = fixture.flatten(&report);
    assert_eq!(found.len(), 4);
    assert!(found.iter().all(|(members, _, _)| members.len() == 1));
    assert!(found.contains(&(vec![0], 2, 3)));
    assert!(found.contains(&(vec![3], 1, 3)));
    assert!(found.contains(&(vec![2], 1, 2)));
}

#[rstest]
#[case::just_above_population(7)]
#[case::far_above_population(1_000)]
fn support_threshold_above_population_yields_nothing(complete_four: Sample, #[case] min_support: usize) {
    let fixture = Fixture::new(&complete_four);
    let report = run(search(4, min_support, 100), &fixture);
    assert!(report.cliques().is_empty());
    assert_eq!(report.calls(), 1);
    assert_eq!(report.offers(), 0);
}

#[rstest]
fn unit_capacity_keeps_only_the_best(complete_four: Sample) {
    let fixture = Fixture::new(&complete_four);
    let report = run(search(3, 1, 1), &fixture);
    let found = fixture.flatten(&report);
    assert_eq!(found, brute_force(&complete_four, 3, 1, 1, &[]));
    assert_eq!(found.len(), 1);
    assert!(report.offers() > 1);
}

#[rstest]
fn size_bound_stops_growth_without_duplicates(saturated_paw: Sample) {
    let fixture = Fixture::new(&saturated_paw);
    let report = run(search(2, 1, 100), &fixture);
    let mut members: Vec<Vec<usize>> = fixture
        .flatten(&report)
        .into_iter()
        .map(|(members, _, _)| members)
        .collect();
    members.sort();
    let expected: Vec<Vec<usize>> = vec![
        vec![0],
        vec![0, 1],
        vec![0, 2],
        vec![1],
        vec![1, 2],
        vec![2],
        vec![2, 3],
        vec![3],
    ];
    assert_eq!(members, expected);
    assert_eq!(report.offers(), 8);
    // Root, one call per single node, one per edge.
    assert_eq!(report.calls(), 1 + 4 + 4);
}

#[rstest]
fn size_bound_above_largest_clique_changes_nothing(saturated_paw: Sample) {
    let fixture = Fixture::new(&saturated_paw);
    let capped = fixture.flatten(&run(search(3, 1, 100), &fixture));
    let uncapped = fixture.flatten(&run(search(10, 1, 100), &fixture));
    assert_eq!(capped, uncapped);
    assert!(capped.iter().any(|(members, _, _)| members == &vec![0, 1, 2]));
}

#[test]
fn isolated_nodes_are_singleton_candidates() {
    let sample = Sample {
        node_count: 3,
        edges: vec![],
        patients: vec![vec![0], vec![1], vec![1, 2]],
        flagged: vec![false, true, true],
    };
    let fixture = Fixture::new(&sample);
    let found = fixture.flatten(&run(search(3, 1, 10), &fixture));
    assert_eq!(found, vec![(vec![1], 2, 2), (vec![2], 1, 1), (vec![0], 0, 1)]);
}

#[test]
fn empty_graph_yields_nothing() {
    let sample = Sample {
        node_count: 0,
        edges: vec![],
        patients: vec![vec![]; 3],
        flagged: vec![true; 3],
    };
    let fixture = Fixture::new(&sample);
    let report = run(search(3, 0, 10), &fixture);
    assert!(report.cliques().is_empty());
    assert_eq!(report.calls(), 1);
}

#[test]
fn zero_support_threshold_never_scores_empty_support() {
    let sample = Sample {
        node_count: 3,
        edges: vec![(0, 1), (1, 2)],
        patients: vec![vec![0], vec![1]],
        flagged: vec![true, false],
    };
    let fixture = Fixture::new(&sample);
    let found = fixture.flatten(&run(search(3, 0, 10), &fixture));
    assert_eq!(found, vec![(vec![0], 1, 1), (vec![1], 0, 1)]);
}

#[rstest]
fn equal_scores_prefer_larger_support_then_smaller_members(saturated_paw: Sample) {
    let fixture = Fixture::new(&saturated_paw);
    let found = fixture.flatten(&run(search(3, 1, 3), &fixture));
    assert_eq!(
        found,
        vec![(vec![0], 1, 3), (vec![0, 1], 1, 3), (vec![0, 1, 2], 1, 3)]
    );
}

#[rstest]
fn repeated_runs_are_identical(complete_four: Sample) {
    let fixture = Fixture::new(&complete_four);
    let search = search(3, 1, 5).build().expect("configuration is valid");
    let first = search
        .run(&fixture.graph, &fixture.index, &fixture.outcomes)
        .expect("search succeeds");
    let second = search
        .run(&fixture.graph, &fixture.index, &fixture.outcomes)
        .expect("search succeeds");
    assert_eq!(first.cliques(), second.cliques());
    assert_eq!(first.calls(), second.calls());
}

#[cfg(feature = "parallel")]
#[rstest]
fn parallel_matches_sequential(complete_four: Sample, saturated_paw: Sample) {
    for sample in [complete_four, saturated_paw] {
        let fixture = Fixture::new(&sample);
        let sequential = run(search(3, 1, 4), &fixture);
        let parallel = run(
            search(3, 1, 4).with_execution_strategy(ExecutionStrategy::Parallel),
            &fixture,
        );
        assert_eq!(sequential.cliques(), parallel.cliques());
        assert_eq!(sequential.calls(), parallel.calls());
        assert_eq!(sequential.offers(), parallel.offers());
    }
}

#[cfg(not(feature = "parallel"))]
#[rstest]
fn parallel_strategy_requires_the_feature(complete_four: Sample) {
    let fixture = Fixture::new(&complete_four);
    let err = search(2, 1, 4)
        .with_execution_strategy(ExecutionStrategy::Parallel)
        .build()
        .expect("configuration is valid")
        .run(&fixture.graph, &fixture.index, &fixture.outcomes)
        .expect_err("parallel backend is not compiled in");
    assert_eq!(err.code(), SearchErrorCode::BackendUnavailable);
}

#[rstest]
fn fixed_nodes_seed_every_clique(saturated_paw: Sample) {
    let fixture = Fixture::new(&saturated_paw);
    let report = run(search(3, 1, 100).with_fixed_nodes([disease(2)]), &fixture);
    let mut members: Vec<Vec<usize>> = fixture
        .flatten(&report)
        .into_iter()
        .map(|(members, _, _)| members)
        .collect();
    members.sort();
    assert_eq!(
        members,
        vec![vec![0, 1, 2], vec![0, 2], vec![1, 2], vec![2, 3]]
    );
    assert_eq!(
        fixture.flatten(&report),
        brute_force(&saturated_paw, 3, 1, 100, &[2])
    );
}

#[rstest]
fn fixed_nodes_filling_the_bound_yield_nothing(saturated_paw: Sample) {
    let fixture = Fixture::new(&saturated_paw);
    let report = run(
        search(2, 1, 100).with_fixed_nodes([disease(0), disease(1)]),
        &fixture,
    );
    assert!(report.cliques().is_empty());
    assert_eq!(report.calls(), 1);
}

#[rstest]
#[case::unknown(vec![disease(9)], SearchErrorCode::UnknownFixedNode)]
#[case::not_adjacent(vec![disease(0), disease(3)], SearchErrorCode::FixedNodesNotAdjacent)]
fn unusable_seeds_are_rejected(
    saturated_paw: Sample,
    #[case] fixed: Vec<DiseaseId>,
    #[case] expected: SearchErrorCode,
) {
    let fixture = Fixture::new(&saturated_paw);
    let err = search(3, 1, 10)
        .with_fixed_nodes(fixed)
        .build()
        .expect("configuration is valid")
        .run(&fixture.graph, &fixture.index, &fixture.outcomes)
        .expect_err("seed must be rejected");
    assert_eq!(err.code(), expected);
}

#[rstest]
fn graph_nodes_must_be_indexed(complete_four: Sample) {
    let fixture = Fixture::new(&complete_four);
    let graph = ComorbidityGraph::builder("wider")
        .with_edge(disease(0), disease(1))
        .with_node("unindexed")
        .build();
    let err = search(2, 1, 10)
        .build()
        .expect("configuration is valid")
        .run(&graph, &fixture.index, &fixture.outcomes)
        .expect_err("unindexed node must be rejected");
    assert_eq!(
        err,
        SearchError::UnindexedNode {
            node: DiseaseId::from("unindexed")
        }
    );
}

#[rstest]
fn outcomes_must_belong_to_the_population(complete_four: Sample) {
    let fixture = Fixture::new(&complete_four);
    let mut outcomes = fixture.outcomes.clone();
    outcomes.insert(patient_id(99));
    let err = search(2, 1, 10)
        .build()
        .expect("configuration is valid")
        .run(&fixture.graph, &fixture.index, &outcomes)
        .expect_err("stray outcome must be rejected");
    assert_eq!(err.code(), SearchErrorCode::OutcomeOutsidePopulation);
}

#[rstest]
fn call_budget_returns_partial_results(saturated_paw: Sample) {
    let fixture = Fixture::new(&saturated_paw);
    let limits = SearchLimits::default().with_max_calls(1);
    let report = run(search(3, 1, 10).with_limits(limits), &fixture);
    assert_eq!(report.termination(), Termination::CallBudgetExhausted);
    assert_eq!(report.calls(), 1);
    let found: Vec<Flat> = fixture.flatten(&report);
    assert_eq!(found, vec![(vec![0], 1, 3)]);
}

#[rstest]
fn generous_budget_completes(saturated_paw: Sample) {
    let fixture = Fixture::new(&saturated_paw);
    let unlimited = run(search(3, 1, 10), &fixture);
    let limits = SearchLimits::default().with_max_calls(unlimited.calls());
    let bounded = run(search(3, 1, 10).with_limits(limits), &fixture);
    assert_eq!(bounded.termination(), Termination::Completed);
    assert_eq!(bounded.cliques(), unlimited.cliques());
}

#[rstest]
fn cancelled_search_returns_nothing(saturated_paw: Sample) {
    let fixture = Fixture::new(&saturated_paw);
    let token = CancellationToken::new();
    token.cancel();
    let limits = SearchLimits::default().with_cancellation(token);
    let report = run(search(3, 1, 10).with_limits(limits), &fixture);
    assert_eq!(report.termination(), Termination::Cancelled);
    assert_eq!(report.calls(), 0);
    assert!(report.cliques().is_empty());
}

#[rstest]
fn cohort_wrapper_matches_explicit_inputs(complete_four: Sample) {
    let fixture = Fixture::new(&complete_four);
    let cohort = Cohort::new(fixture.index.clone(), fixture.outcomes.clone());
    let search = search(2, 2, 10).build().expect("configuration is valid");
    let wrapped = search
        .run_cohort(&fixture.graph, &cohort)
        .expect("search succeeds");
    let explicit = search
        .run(&fixture.graph, &fixture.index, &fixture.outcomes)
        .expect("search succeeds");
    assert_eq!(wrapped.cliques(), explicit.cliques());
}
