use std::num::NonZeroUsize;

use comorbid_core::{
    DiseaseId, ExecutionStrategy, GraphError, GraphErrorCode, PatientId, SearchError,
    SearchErrorCode,
};
use rstest::rstest;

#[rstest]
#[case(GraphError::NodeOutOfBounds { index: 3, node_count: 2 }, GraphErrorCode::NodeOutOfBounds)]
#[case(GraphError::UnsortedNeighbours { node: 1 }, GraphErrorCode::UnsortedNeighbours)]
#[case(GraphError::SelfLoop { node: 0 }, GraphErrorCode::SelfLoop)]
#[case(GraphError::AsymmetricEdge { from: 0, to: 1 }, GraphErrorCode::AsymmetricEdge)]
fn returns_expected_graph_code(#[case] error: GraphError, #[case] expected: GraphErrorCode) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), expected.as_str());
}

#[rstest]
#[case(SearchError::InvalidSizeBound { got: 0 }, SearchErrorCode::InvalidSizeBound, None)]
#[case(SearchError::InvalidCapacity { got: 0 }, SearchErrorCode::InvalidCapacity, None)]
#[case(
    SearchError::TooManyFixedNodes {
        fixed: 4,
        size_bound: NonZeroUsize::new(3).expect("non-zero"),
    },
    SearchErrorCode::TooManyFixedNodes,
    None,
)]
#[case(
    SearchError::DuplicateFixedNode { node: DiseaseId::from("401") },
    SearchErrorCode::DuplicateFixedNode,
    None,
)]
#[case(
    SearchError::UnknownFixedNode { node: DiseaseId::from("999"), graph: "ward".into() },
    SearchErrorCode::UnknownFixedNode,
    None,
)]
#[case(
    SearchError::FixedNodesNotAdjacent {
        left: DiseaseId::from("401"),
        right: DiseaseId::from("428"),
    },
    SearchErrorCode::FixedNodesNotAdjacent,
    None,
)]
#[case(
    SearchError::OutcomeOutsidePopulation { patient: PatientId::from("17") },
    SearchErrorCode::OutcomeOutsidePopulation,
    None,
)]
#[case(
    SearchError::BackendUnavailable { requested: ExecutionStrategy::Parallel },
    SearchErrorCode::BackendUnavailable,
    None,
)]
#[case(
    SearchError::Graph {
        graph: "ward".into(),
        error: GraphError::SelfLoop { node: 2 },
    },
    SearchErrorCode::MalformedGraph,
    Some(GraphErrorCode::SelfLoop),
)]
fn returns_expected_search_code(
    #[case] error: SearchError,
    #[case] expected: SearchErrorCode,
    #[case] graph_code: Option<GraphErrorCode>,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.graph_code(), graph_code);
}

#[test]
fn messages_name_the_offending_input() {
    let error = SearchError::UnknownFixedNode {
        node: DiseaseId::from("999"),
        graph: "ward".into(),
    };
    assert_eq!(
        error.to_string(),
        "fixed node `999` is not present in graph `ward`"
    );
    let error = SearchError::Graph {
        graph: "ward".into(),
        error: GraphError::AsymmetricEdge { from: 0, to: 1 },
    };
    assert_eq!(
        error.to_string(),
        "graph `ward` is malformed: edge (0, 1) has no reverse edge"
    );
    assert!(std::error::Error::source(&error).is_some());
}
