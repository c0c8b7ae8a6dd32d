//! Depth-first expansion of the candidate tree.
//!
//! Each level carries the chosen nodes, the live candidates still to try and
//! the candidates already tried. The live slice handed to a level is never
//! mutated: it doubles as the iteration snapshot, and once `live[i]` has been
//! tried the remaining live set is `live[i + 1..]` while `live[i]` joins the
//! tried set.

use std::{cmp::Ordering, num::NonZeroUsize};

use fixedbitset::FixedBitSet;

use crate::{
    Result,
    cohort::{DiseaseIndex, OutcomeSet},
    error::{GraphError, SearchError},
    graph::GraphProvider,
    ranking::{Admission, Score, TopKQueue},
    search::control::{Halt, SearchControl},
};

/// Patient lists resolved per graph node plus the outcome mask over patient
/// keys.
#[derive(Debug)]
pub(crate) struct PreparedCohort<'a> {
    node_patients: Vec<&'a [u32]>,
    outcome_mask: FixedBitSet,
}

impl<'a> PreparedCohort<'a> {
    /// Resolves every graph node against `index`.
    ///
    /// Fails when a node is not indexed or when a flagged patient lies
    /// outside the indexed population.
    pub(crate) fn new<G: GraphProvider + ?Sized>(
        graph: &G,
        index: &'a DiseaseIndex,
        outcomes: &OutcomeSet,
    ) -> Result<Self> {
        let node_count = graph.node_count();
        let node_patients = (0..node_count)
            .map(|node| {
                let id = graph.node(node).ok_or_else(|| SearchError::Graph {
                    graph: graph.name().to_owned(),
                    error: GraphError::NodeOutOfBounds {
                        index: node,
                        node_count,
                    },
                })?;
                index
                    .keys_for(id)
                    .ok_or_else(|| SearchError::UnindexedNode { node: id.clone() })
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(stray) = outcomes
            .iter()
            .filter(|patient| !index.contains_patient(patient))
            .min()
        {
            return Err(SearchError::OutcomeOutsidePopulation {
                patient: stray.clone(),
            });
        }
        let mut outcome_mask = FixedBitSet::with_capacity(index.population_len());
        for key in outcomes.iter().filter_map(|patient| index.key_of(patient)) {
            outcome_mask.insert(key as usize);
        }

        Ok(Self {
            node_patients,
            outcome_mask,
        })
    }

    /// Sorted patient keys of `node`.
    pub(crate) fn patients(&self, node: usize) -> &'a [u32] {
        self.node_patients.get(node).copied().unwrap_or_default()
    }

    /// Counts the flagged patients in `support`.
    pub(crate) fn outcome_count(&self, support: &[u32]) -> usize {
        support
            .iter()
            .filter(|&&key| self.outcome_mask.contains(key as usize))
            .count()
    }
}

/// Immutable settings shared by every session of one search.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SessionSettings {
    pub(crate) size_bound: usize,
    pub(crate) min_support: usize,
    pub(crate) capacity: NonZeroUsize,
}

/// Totals gathered by a session alongside its queue.
#[derive(Debug)]
pub(crate) struct SessionOutcome {
    pub(crate) queue: TopKQueue,
    pub(crate) offers: u64,
    pub(crate) evictions: u64,
}

impl SessionOutcome {
    /// Folds another session's results into this one.
    pub(crate) fn absorb(&mut self, other: Self) {
        self.queue.merge(other.queue);
        self.offers += other.offers;
        self.evictions += other.evictions;
    }
}

/// One depth-first walk owning its ranking queue.
///
/// Sessions never share a queue; the parallel backend forks one per branch
/// and merges them afterwards.
pub(crate) struct SearchSession<'s, G: ?Sized> {
    graph: &'s G,
    cohort: &'s PreparedCohort<'s>,
    control: &'s SearchControl,
    settings: SessionSettings,
    queue: TopKQueue,
    offers: u64,
    evictions: u64,
}

impl<'s, G: GraphProvider + ?Sized> SearchSession<'s, G> {
    pub(crate) fn new(
        graph: &'s G,
        cohort: &'s PreparedCohort<'s>,
        control: &'s SearchControl,
        settings: SessionSettings,
    ) -> Self {
        Self {
            graph,
            cohort,
            control,
            settings,
            queue: TopKQueue::new(settings.capacity),
            offers: 0,
            evictions: 0,
        }
    }

    /// A fresh session over the same inputs with an empty queue.
    pub(crate) fn fork(&self) -> Self {
        Self::new(self.graph, self.cohort, self.control, self.settings)
    }

    pub(crate) fn finish(self) -> SessionOutcome {
        SessionOutcome {
            queue: self.queue,
            offers: self.offers,
            evictions: self.evictions,
        }
    }

    /// Counts one recursive invocation and reports whether the level has
    /// anything to expand: the size bound is not reached and some candidate
    /// is live or tried.
    pub(crate) fn open(
        &self,
        chosen: &[usize],
        live: &[usize],
        tried: &[usize],
    ) -> std::result::Result<bool, Halt> {
        self.control.enter()?;
        Ok(chosen.len() < self.settings.size_bound && !(live.is_empty() && tried.is_empty()))
    }

    /// One recursive invocation: tries every live candidate in ascending
    /// order, moving each to the tried set once explored.
    pub(crate) fn expand(
        &mut self,
        chosen: &mut Vec<usize>,
        live: &[usize],
        mut tried: Vec<usize>,
        support: &[u32],
    ) -> std::result::Result<(), Halt> {
        if !self.open(chosen, live, &tried)? {
            return Ok(());
        }
        for (position, &node) in live.iter().enumerate() {
            self.extend_with(chosen, node, &live[position + 1..], &tried, support)?;
            insert_sorted(&mut tried, node);
        }
        Ok(())
    }

    /// Tries `node` as the next member: scores the grown clique when its
    /// support meets the threshold and recurses into the shrunken candidate
    /// sets.
    ///
    /// `remaining` holds the live candidates after `node`; `tried` holds the
    /// candidates already explored at this level.
    pub(crate) fn extend_with(
        &mut self,
        chosen: &mut Vec<usize>,
        node: usize,
        remaining: &[usize],
        tried: &[usize],
        support: &[u32],
    ) -> std::result::Result<(), Halt> {
        let patients = self.cohort.patients(node);
        if patients.len() < self.settings.min_support {
            return Ok(());
        }
        let next_support = intersect_sorted(support, patients);
        if next_support.len() < self.settings.min_support {
            return Ok(());
        }

        let slot = chosen.binary_search(&node).unwrap_or_else(|slot| slot);
        chosen.insert(slot, node);
        if let Some(score) = Score::new(self.cohort.outcome_count(&next_support), next_support.len()) {
            let admission = self.queue.offer(chosen.as_slice(), score);
            self.record(admission);
        }
        let outcome = self.descend(chosen, node, remaining, tried, &next_support);
        chosen.remove(slot);
        outcome
    }

    fn descend(
        &mut self,
        chosen: &mut Vec<usize>,
        node: usize,
        remaining: &[usize],
        tried: &[usize],
        support: &[u32],
    ) -> std::result::Result<(), Halt> {
        let graph = self.graph;
        let neighbours = graph.neighbours(node)?;
        let next_live = intersect_sorted(remaining, neighbours);
        let next_tried = intersect_sorted(tried, neighbours);
        self.expand(chosen, &next_live, next_tried, support)
    }

    fn record(&mut self, admission: Admission) {
        self.offers += 1;
        if admission == Admission::Replaced {
            self.evictions += 1;
        }
    }
}

/// Elements present in both ascending slices, ascending.
pub(crate) fn intersect_sorted<T: Ord + Copy>(left: &[T], right: &[T]) -> Vec<T> {
    let mut shared = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0, 0);
    while let (Some(&a), Some(&b)) = (left.get(i), right.get(j)) {
        match a.cmp(&b) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                shared.push(a);
                i += 1;
                j += 1;
            }
        }
    }
    shared
}

fn insert_sorted(values: &mut Vec<usize>, value: usize) {
    if let Err(slot) = values.binary_search(&value) {
        values.insert(slot, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::disjoint(&[1, 3, 5], &[2, 4], &[])]
    #[case::overlap(&[1, 2, 3, 7], &[2, 3, 4, 7], &[2, 3, 7])]
    #[case::empty_left(&[], &[1], &[])]
    #[case::identical(&[4, 9], &[4, 9], &[4, 9])]
    fn intersect_sorted_matches_set_intersection(
        #[case] left: &[u32],
        #[case] right: &[u32],
        #[case] expected: &[u32],
    ) {
        assert_eq!(intersect_sorted(left, right), expected);
    }

    #[test]
    fn insert_sorted_keeps_order_and_uniqueness() {
        let mut values = vec![1, 5];
        insert_sorted(&mut values, 3);
        insert_sorted(&mut values, 5);
        insert_sorted(&mut values, 0);
        assert_eq!(values, vec![0, 1, 3, 5]);
    }
}
