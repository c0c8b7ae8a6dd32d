//! Benchmark parameter types.

use std::fmt;

use comorbid_core::ExecutionStrategy;

/// Parameters for one clique-search benchmark run.
#[derive(Clone, Debug)]
pub struct SearchBenchParams {
    /// Number of diseases in the synthetic graph.
    pub diseases: usize,
    /// Largest clique size searched.
    pub size_bound: usize,
    /// Backend exercised by the run.
    pub strategy: ExecutionStrategy,
}

impl fmt::Display for SearchBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match self.strategy {
            ExecutionStrategy::Parallel => "parallel",
            ExecutionStrategy::Sequential => "sequential",
            ExecutionStrategy::Auto => "auto",
        };
        write!(f, "d={},b={},{strategy}", self.diseases, self.size_bound)
    }
}
