//! Builder utilities for configuring [`CliqueSearch`].

use std::num::NonZeroUsize;

use crate::{
    Result,
    error::SearchError,
    graph::DiseaseId,
    search::{CliqueSearch, SearchLimits},
};

/// Selects how [`CliqueSearch::run`] explores the search tree.
///
/// `Auto` uses the parallel backend when the `parallel` feature is compiled
/// in and runs sequentially otherwise. Every strategy returns the same ranked
/// cliques for a completed search.
///
/// # Examples
/// ```
/// use comorbid_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::default();
/// assert_eq!(strategy, ExecutionStrategy::Auto);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ExecutionStrategy {
    /// Let the library choose a backend.
    #[default]
    Auto,
    /// Explore the tree on the calling thread.
    Sequential,
    /// Explore top-level branches on the rayon thread pool.
    Parallel,
}

/// Validating builder for [`CliqueSearch`].
///
/// Defaults: `size_bound` 3, `min_support` 1, `capacity` 100, no fixed
/// nodes, [`ExecutionStrategy::Auto`] and no limits.
///
/// # Examples
/// ```
/// use comorbid_core::{CliqueSearchBuilder, ExecutionStrategy};
///
/// let search = CliqueSearchBuilder::new()
///     .with_size_bound(4)
///     .with_min_support(100)
///     .with_capacity(25)
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(search.size_bound().get(), 4);
/// assert_eq!(search.min_support(), 100);
/// assert_eq!(search.capacity().get(), 25);
/// ```
#[derive(Clone, Debug)]
pub struct CliqueSearchBuilder {
    size_bound: usize,
    min_support: usize,
    capacity: usize,
    fixed_nodes: Vec<DiseaseId>,
    execution_strategy: ExecutionStrategy,
    limits: SearchLimits,
}

impl Default for CliqueSearchBuilder {
    fn default() -> Self {
        Self {
            size_bound: 3,
            min_support: 1,
            capacity: 100,
            fixed_nodes: Vec::new(),
            execution_strategy: ExecutionStrategy::Auto,
            limits: SearchLimits::default(),
        }
    }
}

impl CliqueSearchBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the largest clique size explored.
    #[must_use]
    pub fn with_size_bound(mut self, size_bound: usize) -> Self {
        self.size_bound = size_bound;
        self
    }

    /// Sets the minimum support a clique needs to be scored.
    ///
    /// Zero behaves like one: empty support sets are never scored.
    #[must_use]
    pub fn with_min_support(mut self, min_support: usize) -> Self {
        self.min_support = min_support;
        self
    }

    /// Sets how many cliques the ranking retains.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Seeds every clique with `nodes`.
    ///
    /// The nodes must exist in the searched graph and be pairwise adjacent.
    /// The seed itself is never reported.
    #[must_use]
    pub fn with_fixed_nodes(mut self, nodes: impl IntoIterator<Item = DiseaseId>) -> Self {
        self.fixed_nodes = nodes.into_iter().collect();
        self
    }

    /// Sets the execution strategy.
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Bounds the search by calls, time or cancellation.
    #[must_use]
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Configured size bound.
    #[must_use]
    #[rustfmt::skip]
    pub fn size_bound(&self) -> usize { self.size_bound }

    /// Configured minimum support.
    #[must_use]
    #[rustfmt::skip]
    pub fn min_support(&self) -> usize { self.min_support }

    /// Configured capacity.
    #[must_use]
    #[rustfmt::skip]
    pub fn capacity(&self) -> usize { self.capacity }

    /// Configured execution strategy.
    #[must_use]
    #[rustfmt::skip]
    pub fn execution_strategy(&self) -> ExecutionStrategy { self.execution_strategy }

    /// Validates the configuration and constructs a [`CliqueSearch`].
    ///
    /// # Errors
    /// Returns [`SearchError::InvalidSizeBound`] or
    /// [`SearchError::InvalidCapacity`] for zero values,
    /// [`SearchError::TooManyFixedNodes`] when the seed exceeds the size
    /// bound and [`SearchError::DuplicateFixedNode`] for repeated seeds.
    ///
    /// # Examples
    /// ```
    /// use comorbid_core::{CliqueSearchBuilder, SearchErrorCode};
    ///
    /// let err = CliqueSearchBuilder::new()
    ///     .with_size_bound(0)
    ///     .build()
    ///     .expect_err("zero is rejected");
    /// assert_eq!(err.code(), SearchErrorCode::InvalidSizeBound);
    /// ```
    pub fn build(self) -> Result<CliqueSearch> {
        let size_bound = NonZeroUsize::new(self.size_bound).ok_or(SearchError::InvalidSizeBound {
            got: self.size_bound,
        })?;
        let capacity = NonZeroUsize::new(self.capacity).ok_or(SearchError::InvalidCapacity {
            got: self.capacity,
        })?;
        if self.fixed_nodes.len() > size_bound.get() {
            return Err(SearchError::TooManyFixedNodes {
                fixed: self.fixed_nodes.len(),
                size_bound,
            });
        }
        let mut fixed_nodes = self.fixed_nodes;
        fixed_nodes.sort_unstable();
        if let Some(pair) = fixed_nodes.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(SearchError::DuplicateFixedNode {
                node: pair[0].clone(),
            });
        }

        Ok(CliqueSearch::new(
            size_bound,
            self.min_support,
            capacity,
            fixed_nodes,
            self.execution_strategy,
            self.limits,
        ))
    }
}
