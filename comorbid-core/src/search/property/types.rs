//! Type definitions for clique search property tests.

use crate::test_utils::Sample;

/// Edge density used when generating a graph.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum GraphShape {
    /// No edges; every clique is a single node.
    Edgeless,
    /// Roughly one pair in five is adjacent.
    Sparse,
    /// Most pairs are adjacent.
    Dense,
    /// Every pair is adjacent.
    Complete,
}

/// A generated cohort together with the search parameters to run on it.
#[derive(Clone, Debug)]
pub(super) struct SearchCase {
    pub sample: Sample,
    pub size_bound: usize,
    pub min_support: usize,
    pub capacity: usize,
    /// At most one seed node.
    pub fixed: Vec<usize>,
    pub shape: GraphShape,
}
