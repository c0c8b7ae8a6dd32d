//! Density-constrained clique search.
//!
//! The search walks cliques of the comorbidity graph in ascending node order,
//! carrying the set of patients who exhibit every chosen disease. Each
//! extension whose support set still holds at least `min_support` patients
//! is scored by the share of flagged patients and offered to a bounded
//! [`TopKQueue`](crate::TopKQueue); extensions below the threshold are
//! pruned, since support can only shrink further down a branch.

mod builder;
mod control;
mod session;

#[cfg(test)]
mod property;
#[cfg(test)]
mod tests;

use std::{num::NonZeroUsize, time::Instant};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, instrument, warn};

pub use self::{
    builder::{CliqueSearchBuilder, ExecutionStrategy},
    control::{CancellationToken, SearchLimits},
};
use self::{
    control::{Halt, SearchControl},
    session::{PreparedCohort, SearchSession, SessionOutcome, SessionSettings, intersect_sorted},
};
use crate::{
    Result,
    cohort::{Cohort, DiseaseIndex, OutcomeSet},
    error::{GraphError, SearchError},
    graph::{DiseaseId, GraphProvider},
    result::{ScoredClique, SearchReport},
};

/// A validated clique search configuration.
///
/// Construct it with [`CliqueSearchBuilder`], then call [`Self::run`] as many
/// times as needed; every run owns its own ranking state.
///
/// # Examples
/// ```
/// use comorbid_core::{CliqueSearch, ComorbidityGraph, DiseaseIndex, OutcomeSet};
///
/// let graph = ComorbidityGraph::builder("pair").with_edge("a", "b").build();
/// let mut index = DiseaseIndex::builder();
/// for (patient, disease) in [("1", "a"), ("1", "b"), ("2", "a"), ("2", "b"), ("3", "a")] {
///     index.add_diagnosis(patient, disease)?;
/// }
/// let index = index.build();
/// let outcomes: OutcomeSet = ["1".into()].into_iter().collect();
///
/// let search = CliqueSearch::builder()
///     .with_size_bound(2)
///     .with_min_support(2)
///     .build()?;
/// let report = search.run(&graph, &index, &outcomes)?;
/// let best = &report.cliques()[0];
/// assert_eq!(best.len(), 2);
/// assert_eq!((best.outcomes(), best.support()), (1, 2));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct CliqueSearch {
    size_bound: NonZeroUsize,
    min_support: usize,
    capacity: NonZeroUsize,
    fixed_nodes: Vec<DiseaseId>,
    execution_strategy: ExecutionStrategy,
    limits: SearchLimits,
}

/// Starting point of the recursion.
#[derive(Debug)]
struct Seed {
    chosen: Vec<usize>,
    live: Vec<usize>,
    support: Vec<u32>,
}

enum Backend {
    Sequential,
    #[cfg(feature = "parallel")]
    Parallel,
}

impl CliqueSearch {
    pub(crate) fn new(
        size_bound: NonZeroUsize,
        min_support: usize,
        capacity: NonZeroUsize,
        fixed_nodes: Vec<DiseaseId>,
        execution_strategy: ExecutionStrategy,
        limits: SearchLimits,
    ) -> Self {
        Self {
            size_bound,
            min_support,
            capacity,
            fixed_nodes,
            execution_strategy,
            limits,
        }
    }

    /// Starts a [`CliqueSearchBuilder`] with default settings.
    #[must_use]
    pub fn builder() -> CliqueSearchBuilder {
        CliqueSearchBuilder::new()
    }

    /// Largest clique size explored.
    #[must_use]
    #[rustfmt::skip]
    pub fn size_bound(&self) -> NonZeroUsize { self.size_bound }

    /// Minimum support a clique needs to be scored.
    #[must_use]
    #[rustfmt::skip]
    pub fn min_support(&self) -> usize { self.min_support }

    /// Number of cliques retained.
    #[must_use]
    #[rustfmt::skip]
    pub fn capacity(&self) -> NonZeroUsize { self.capacity }

    /// Nodes seeding every clique, ascending.
    #[must_use]
    #[rustfmt::skip]
    pub fn fixed_nodes(&self) -> &[DiseaseId] { &self.fixed_nodes }

    /// Configured execution strategy.
    #[must_use]
    #[rustfmt::skip]
    pub fn execution_strategy(&self) -> ExecutionStrategy { self.execution_strategy }

    /// Configured limits.
    #[must_use]
    #[rustfmt::skip]
    pub fn limits(&self) -> &SearchLimits { &self.limits }

    /// Convenience wrapper over [`Self::run`] for a [`Cohort`].
    ///
    /// # Errors
    /// Same as [`Self::run`].
    pub fn run_cohort<G>(&self, graph: &G, cohort: &Cohort) -> Result<SearchReport>
    where
        G: GraphProvider + Sync + ?Sized,
    {
        self.run(graph, cohort.index(), cohort.outcomes())
    }

    /// Searches `graph` for the best-scoring cliques.
    ///
    /// Cliques are ranked by score, then by larger support, then by the
    /// lexicographically smaller list of node indices. Every strategy yields
    /// the same ranking for a completed search. When a limit stops the
    /// search early the report carries the best cliques found so far and
    /// the matching [`Termination`](crate::Termination).
    ///
    /// # Errors
    /// Returns [`SearchError::Graph`] when the provider breaks its contract,
    /// [`SearchError::UnindexedNode`] or
    /// [`SearchError::OutcomeOutsidePopulation`] for inconsistent inputs,
    /// [`SearchError::UnknownFixedNode`] or
    /// [`SearchError::FixedNodesNotAdjacent`] for an unusable seed and
    /// [`SearchError::BackendUnavailable`] when the requested strategy is
    /// not compiled in.
    #[instrument(
        name = "core.search.run",
        err,
        skip(self, graph, index, outcomes),
        fields(
            graph = %graph.name(),
            nodes = graph.node_count(),
            size_bound = %self.size_bound,
            min_support = self.min_support,
            capacity = %self.capacity,
            strategy = ?self.execution_strategy
        ),
    )]
    pub fn run<G>(&self, graph: &G, index: &DiseaseIndex, outcomes: &OutcomeSet) -> Result<SearchReport>
    where
        G: GraphProvider + Sync + ?Sized,
    {
        let backend = self.backend()?;
        graph
            .validate()
            .map_err(|error| graph_failure(graph, error))?;
        let cohort = PreparedCohort::new(graph, index, outcomes)?;
        let seed = self.seed(graph, &cohort, index)?;

        let started = Instant::now();
        let control = SearchControl::new(&self.limits, started);
        let settings = SessionSettings {
            size_bound: self.size_bound.get(),
            min_support: self.min_support.max(1),
            capacity: self.capacity,
        };
        let session = SearchSession::new(graph, &cohort, &control, settings);
        let outcome = match backend {
            Backend::Sequential => run_sequential(session, seed),
            #[cfg(feature = "parallel")]
            Backend::Parallel => run_parallel(session, seed),
        }
        .map_err(|error| graph_failure(graph, error))?;

        let evictions = outcome.evictions;
        let report = build_report(graph, outcome, &control, started);
        if report.termination().is_complete() {
            info!(
                calls = report.calls(),
                offers = report.offers(),
                retained = report.cliques().len(),
                "clique search completed"
            );
        } else {
            warn!(
                calls = report.calls(),
                retained = report.cliques().len(),
                termination = %report.termination(),
                "clique search stopped early, returning partial results"
            );
        }
        record_metrics(&report, evictions);
        Ok(report)
    }

    fn backend(&self) -> Result<Backend> {
        match self.execution_strategy {
            ExecutionStrategy::Sequential => Ok(Backend::Sequential),
            #[cfg(feature = "parallel")]
            ExecutionStrategy::Auto | ExecutionStrategy::Parallel => Ok(Backend::Parallel),
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Auto => Ok(Backend::Sequential),
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Parallel => Err(SearchError::BackendUnavailable {
                requested: ExecutionStrategy::Parallel,
            }),
        }
    }

    /// Resolves the fixed nodes into the root state: the seed clique, the
    /// candidates adjacent to all of it and the patients exhibiting all of
    /// it.
    fn seed<G>(&self, graph: &G, cohort: &PreparedCohort<'_>, index: &DiseaseIndex) -> Result<Seed>
    where
        G: GraphProvider + ?Sized,
    {
        let resolved = self
            .fixed_nodes
            .iter()
            .map(|id| {
                graph
                    .index_of(id)
                    .map(|node| (id, node))
                    .ok_or_else(|| SearchError::UnknownFixedNode {
                        node: id.clone(),
                        graph: graph.name().to_owned(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        for (position, &(left_id, left)) in resolved.iter().enumerate() {
            for &(right_id, right) in &resolved[position + 1..] {
                let adjacent = graph
                    .are_adjacent(left, right)
                    .map_err(|error| graph_failure(graph, error))?;
                if !adjacent {
                    return Err(SearchError::FixedNodesNotAdjacent {
                        left: left_id.clone(),
                        right: right_id.clone(),
                    });
                }
            }
        }

        let mut chosen: Vec<usize> = resolved.iter().map(|&(_, node)| node).collect();
        chosen.sort_unstable();
        let mut live: Vec<usize> = (0..graph.node_count()).collect();
        let mut support = index.population_keys();
        for &node in &chosen {
            let neighbours = graph
                .neighbours(node)
                .map_err(|error| graph_failure(graph, error))?;
            live = intersect_sorted(&live, neighbours);
            support = intersect_sorted(&support, cohort.patients(node));
        }

        Ok(Seed {
            chosen,
            live,
            support,
        })
    }
}

fn graph_failure<G: GraphProvider + ?Sized>(graph: &G, error: GraphError) -> SearchError {
    SearchError::Graph {
        graph: graph.name().to_owned(),
        error,
    }
}

fn run_sequential<G>(mut session: SearchSession<'_, G>, seed: Seed) -> std::result::Result<SessionOutcome, GraphError>
where
    G: GraphProvider + ?Sized,
{
    let Seed {
        mut chosen,
        live,
        support,
    } = seed;
    match session.expand(&mut chosen, &live, Vec::new(), &support) {
        Ok(()) | Err(Halt::Interrupted(_)) => Ok(session.finish()),
        Err(Halt::Graph(error)) => Err(error),
    }
}

/// Counts the root invocation on the calling thread, then explores each
/// root candidate as an independent branch with its own queue.
///
/// Branch `i` sees the candidates after it as live and the ones before it as
/// tried, exactly as the sequential walk would, so the merged queues hold the
/// same cliques.
#[cfg(feature = "parallel")]
#[cfg_attr(docsrs, doc(cfg(feature = "parallel")))]
fn run_parallel<G>(session: SearchSession<'_, G>, seed: Seed) -> std::result::Result<SessionOutcome, GraphError>
where
    G: GraphProvider + Sync + ?Sized,
{
    let Seed {
        chosen,
        live,
        support,
    } = seed;
    match session.open(&chosen, &live, &[]) {
        Ok(true) => {}
        Ok(false) | Err(Halt::Interrupted(_)) => return Ok(session.finish()),
        Err(Halt::Graph(error)) => return Err(error),
    }

    let branches: Vec<std::result::Result<SessionOutcome, GraphError>> = live
        .par_iter()
        .enumerate()
        .map(|(position, &node)| {
            explore_branch(
                session.fork(),
                chosen.clone(),
                node,
                &live[position + 1..],
                &live[..position],
                &support,
            )
        })
        .collect();

    let mut merged = session.finish();
    for branch in branches {
        merged.absorb(branch?);
    }
    Ok(merged)
}

#[cfg(feature = "parallel")]
#[instrument(name = "core.search.branch", level = "trace", skip_all, fields(node = node))]
fn explore_branch<G>(
    mut branch: SearchSession<'_, G>,
    mut chosen: Vec<usize>,
    node: usize,
    remaining: &[usize],
    tried: &[usize],
    support: &[u32],
) -> std::result::Result<SessionOutcome, GraphError>
where
    G: GraphProvider + ?Sized,
{
    match branch.extend_with(&mut chosen, node, remaining, tried, support) {
        Ok(()) | Err(Halt::Interrupted(_)) => Ok(branch.finish()),
        Err(Halt::Graph(error)) => Err(error),
    }
}

fn build_report<G>(graph: &G, outcome: SessionOutcome, control: &SearchControl, started: Instant) -> SearchReport
where
    G: GraphProvider + ?Sized,
{
    let cliques = outcome
        .queue
        .drain()
        .into_iter()
        .map(|entry| {
            let members = entry
                .members()
                .iter()
                .filter_map(|&node| graph.node(node).cloned())
                .collect();
            ScoredClique::new(members, entry.score())
        })
        .collect();
    SearchReport::new(
        cliques,
        control.calls(),
        outcome.offers,
        control.termination(),
        started.elapsed(),
    )
}

#[cfg(feature = "metrics")]
fn record_metrics(report: &SearchReport, evictions: u64) {
    metrics::counter!("clique_search_calls").increment(report.calls());
    metrics::counter!("clique_search_offers").increment(report.offers());
    metrics::counter!("clique_queue_evictions").increment(evictions);
    metrics::histogram!("clique_search_duration_seconds").record(report.elapsed().as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
fn record_metrics(_report: &SearchReport, _evictions: u64) {}
