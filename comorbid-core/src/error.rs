//! Error types for the comorbid core library.
//!
//! Configuration mistakes and inconsistent inputs are reported through
//! [`SearchError`]; structural problems in a [`crate::GraphProvider`] surface
//! as [`GraphError`]. Running out of budget is not an error: it is reported
//! through [`crate::Termination`] alongside the partial results.

use std::{fmt, num::NonZeroUsize};

use thiserror::Error;

use crate::{cohort::PatientId, graph::DiseaseId, search::ExecutionStrategy};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Structural defects detected in a [`crate::GraphProvider`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    /// A node index lay outside `0..node_count`.
    #[error("node index {index} is out of bounds for a graph with {node_count} nodes")]
    NodeOutOfBounds {
        /// The offending node index.
        index: usize,
        /// Number of nodes reported by the provider.
        node_count: usize,
    },
    /// A neighbour list was not strictly ascending.
    #[error("neighbours of node {node} are not strictly ascending")]
    UnsortedNeighbours {
        /// Node whose neighbour list is malformed.
        node: usize,
    },
    /// A node listed itself as a neighbour.
    #[error("node {node} lists itself as a neighbour")]
    SelfLoop {
        /// Node carrying the self loop.
        node: usize,
    },
    /// An edge was present in one direction only.
    #[error("edge ({from}, {to}) has no reverse edge")]
    AsymmetricEdge {
        /// Node that lists the edge.
        from: usize,
        /// Node that does not list it back.
        to: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// A node index lay outside `0..node_count`.
        NodeOutOfBounds => NodeOutOfBounds { .. } => "GRAPH_NODE_OUT_OF_BOUNDS",
        /// A neighbour list was not strictly ascending.
        UnsortedNeighbours => UnsortedNeighbours { .. } => "GRAPH_UNSORTED_NEIGHBOURS",
        /// A node listed itself as a neighbour.
        SelfLoop => SelfLoop { .. } => "GRAPH_SELF_LOOP",
        /// An edge was present in one direction only.
        AsymmetricEdge => AsymmetricEdge { .. } => "GRAPH_ASYMMETRIC_EDGE",
    }
}

/// Error type produced when configuring or running [`crate::CliqueSearch`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SearchError {
    /// The clique size bound must be at least one.
    #[error("size_bound must be at least 1 (got {got})")]
    InvalidSizeBound {
        /// The rejected size bound.
        got: usize,
    },
    /// The ranking queue must retain at least one clique.
    #[error("capacity must be at least 1 (got {got})")]
    InvalidCapacity {
        /// The rejected capacity.
        got: usize,
    },
    /// More fixed nodes were supplied than the size bound allows.
    #[error("{fixed} fixed nodes exceed size_bound {size_bound}")]
    TooManyFixedNodes {
        /// Number of fixed nodes requested.
        fixed: usize,
        /// Configured size bound.
        size_bound: NonZeroUsize,
    },
    /// The same fixed node was supplied twice.
    #[error("fixed node `{node}` was supplied more than once")]
    DuplicateFixedNode {
        /// The repeated identifier.
        node: DiseaseId,
    },
    /// A fixed node does not exist in the graph.
    #[error("fixed node `{node}` is not present in graph `{graph}`")]
    UnknownFixedNode {
        /// The missing identifier.
        node: DiseaseId,
        /// Name of the graph provider.
        graph: String,
    },
    /// Two fixed nodes are not adjacent, so they cannot seed a clique.
    #[error("fixed nodes `{left}` and `{right}` are not adjacent")]
    FixedNodesNotAdjacent {
        /// First node of the non-adjacent pair.
        left: DiseaseId,
        /// Second node of the non-adjacent pair.
        right: DiseaseId,
    },
    /// A graph node has no entry in the disease index.
    #[error("graph node `{node}` has no entry in the disease index")]
    UnindexedNode {
        /// The graph node lacking patients.
        node: DiseaseId,
    },
    /// An outcome-positive patient is missing from the indexed population.
    #[error("outcome patient `{patient}` is not part of the indexed population")]
    OutcomeOutsidePopulation {
        /// The stray patient identifier.
        patient: PatientId,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// The graph provider violated its structural contract.
    #[error("graph `{graph}` is malformed: {error}")]
    Graph {
        /// Name of the graph provider.
        graph: String,
        /// Underlying structural defect.
        #[source]
        error: GraphError,
    },
}

define_error_codes! {
    /// Stable codes describing [`SearchError`] variants.
    enum SearchErrorCode for SearchError {
        /// The clique size bound must be at least one.
        InvalidSizeBound => InvalidSizeBound { .. } => "SEARCH_INVALID_SIZE_BOUND",
        /// The ranking queue must retain at least one clique.
        InvalidCapacity => InvalidCapacity { .. } => "SEARCH_INVALID_CAPACITY",
        /// More fixed nodes were supplied than the size bound allows.
        TooManyFixedNodes => TooManyFixedNodes { .. } => "SEARCH_TOO_MANY_FIXED_NODES",
        /// The same fixed node was supplied twice.
        DuplicateFixedNode => DuplicateFixedNode { .. } => "SEARCH_DUPLICATE_FIXED_NODE",
        /// A fixed node does not exist in the graph.
        UnknownFixedNode => UnknownFixedNode { .. } => "SEARCH_UNKNOWN_FIXED_NODE",
        /// Two fixed nodes are not adjacent.
        FixedNodesNotAdjacent => FixedNodesNotAdjacent { .. } => "SEARCH_FIXED_NODES_NOT_ADJACENT",
        /// A graph node has no entry in the disease index.
        UnindexedNode => UnindexedNode { .. } => "SEARCH_UNINDEXED_NODE",
        /// An outcome-positive patient is missing from the indexed population.
        OutcomeOutsidePopulation => OutcomeOutsidePopulation { .. } => "SEARCH_OUTCOME_OUTSIDE_POPULATION",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "SEARCH_BACKEND_UNAVAILABLE",
        /// The graph provider violated its structural contract.
        MalformedGraph => Graph { .. } => "SEARCH_MALFORMED_GRAPH",
    }
}

impl SearchError {
    /// Retrieve the inner [`GraphErrorCode`] when the error originated in a
    /// [`crate::GraphProvider`].
    #[must_use]
    pub const fn graph_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::Graph { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Returns `true` for errors caused by invalid search parameters rather
    /// than by the supplied data.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidSizeBound { .. }
                | Self::InvalidCapacity { .. }
                | Self::TooManyFixedNodes { .. }
                | Self::DuplicateFixedNode { .. }
                | Self::BackendUnavailable { .. }
        )
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, SearchError>;
