//! Oracle equivalence: the search retains exactly the cliques an exhaustive
//! enumeration ranks best, and every backend agrees.

use proptest::test_runner::{TestCaseError, TestCaseResult};

use crate::{
    search::{CliqueSearch, ExecutionStrategy},
    result::SearchReport,
    test_utils::{Fixture, brute_force, disease},
};

use super::types::SearchCase;

pub(super) fn run_case(
    case: &SearchCase,
    fixture: &Fixture,
    strategy: ExecutionStrategy,
) -> Result<SearchReport, TestCaseError> {
    CliqueSearch::builder()
        .with_size_bound(case.size_bound)
        .with_min_support(case.min_support)
        .with_capacity(case.capacity)
        .with_fixed_nodes(case.fixed.iter().map(|&node| disease(node)))
        .with_execution_strategy(strategy)
        .build()
        .and_then(|search| search.run(&fixture.graph, &fixture.index, &fixture.outcomes))
        .map_err(|error| TestCaseError::fail(format!("search failed: {error} ({case:?})")))
}

/// Compares the sequential walk against the exhaustive oracle.
pub(super) fn run_oracle_equivalence_property(case: &SearchCase) -> TestCaseResult {
    let fixture = Fixture::new(&case.sample);
    let report = run_case(case, &fixture, ExecutionStrategy::Sequential)?;
    let found = fixture.flatten(&report);
    let expected = brute_force(
        &case.sample,
        case.size_bound,
        case.min_support,
        case.capacity,
        &case.fixed,
    );
    if found != expected {
        return Err(TestCaseError::fail(format!(
            "oracle mismatch: search={found:?}, oracle={expected:?} \
             (shape={:?}, b={}, lb={}, k={}, fixed={:?})",
            case.shape, case.size_bound, case.min_support, case.capacity, case.fixed,
        )));
    }
    Ok(())
}

/// Compares the parallel backend against the sequential walk, including the
/// diagnostic counters.
#[cfg(feature = "parallel")]
pub(super) fn run_backend_agreement_property(case: &SearchCase) -> TestCaseResult {
    let fixture = Fixture::new(&case.sample);
    let sequential = run_case(case, &fixture, ExecutionStrategy::Sequential)?;
    let parallel = run_case(case, &fixture, ExecutionStrategy::Parallel)?;
    if sequential.cliques() != parallel.cliques() {
        return Err(TestCaseError::fail(format!(
            "backends disagree: sequential={:?}, parallel={:?} (shape={:?})",
            fixture.flatten(&sequential),
            fixture.flatten(&parallel),
            case.shape,
        )));
    }
    if (sequential.calls(), sequential.offers()) != (parallel.calls(), parallel.offers()) {
        return Err(TestCaseError::fail(format!(
            "counter mismatch: sequential=({}, {}), parallel=({}, {})",
            sequential.calls(),
            sequential.offers(),
            parallel.calls(),
            parallel.offers(),
        )));
    }
    Ok(())
}
