//! Result types for clique searches.

use std::{fmt, time::Duration};

use crate::{graph::DiseaseId, ranking::Score};

/// A clique reported by [`crate::CliqueSearch::run`].
///
/// # Examples
/// ```
/// use comorbid_core::{DiseaseId, Score, ScoredClique};
///
/// let clique = ScoredClique::new(
///     vec![DiseaseId::from("b"), DiseaseId::from("a")],
///     Score::new(2, 3).expect("valid score"),
/// );
/// assert_eq!(clique.members()[0].as_str(), "a");
/// assert_eq!(clique.support(), 3);
/// assert_eq!(clique.outcomes(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoredClique {
    members: Vec<DiseaseId>,
    score: Score,
}

impl ScoredClique {
    /// Creates a clique, sorting its members.
    #[must_use]
    pub fn new(mut members: Vec<DiseaseId>, score: Score) -> Self {
        members.sort_unstable();
        Self { members, score }
    }

    /// Member diseases in ascending identifier order.
    #[must_use]
    #[rustfmt::skip]
    pub fn members(&self) -> &[DiseaseId] { &self.members }

    /// Number of member diseases.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.members.len() }

    /// Returns whether the clique has no members.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.members.is_empty() }

    /// Outcome density of the clique's support set.
    #[must_use]
    #[rustfmt::skip]
    pub fn score(&self) -> Score { self.score }

    /// Number of patients exhibiting every member.
    #[must_use]
    pub fn support(&self) -> usize {
        self.score.support()
    }

    /// Number of outcome-positive patients in the support set.
    #[must_use]
    pub fn outcomes(&self) -> usize {
        self.score.outcomes()
    }
}

/// Why a search stopped.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Termination {
    /// Every branch was explored.
    Completed,
    /// The configured recursive-call budget ran out.
    CallBudgetExhausted,
    /// The configured time limit elapsed.
    TimeLimitReached,
    /// The caller cancelled the search.
    Cancelled,
}

impl Termination {
    /// Stable machine-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::CallBudgetExhausted => "call_budget_exhausted",
            Self::TimeLimitReached => "time_limit_reached",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` when the search space was exhausted.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a clique search: the ranked cliques plus diagnostics.
///
/// When the search stops early the cliques are the best found so far.
#[derive(Clone, Debug)]
pub struct SearchReport {
    cliques: Vec<ScoredClique>,
    calls: u64,
    offers: u64,
    termination: Termination,
    elapsed: Duration,
}

impl SearchReport {
    pub(crate) fn new(
        cliques: Vec<ScoredClique>,
        calls: u64,
        offers: u64,
        termination: Termination,
        elapsed: Duration,
    ) -> Self {
        Self {
            cliques,
            calls,
            offers,
            termination,
            elapsed,
        }
    }

    /// Retained cliques, best first.
    #[must_use]
    #[rustfmt::skip]
    pub fn cliques(&self) -> &[ScoredClique] { &self.cliques }

    /// Consumes the report, returning the ranked cliques.
    #[must_use]
    #[rustfmt::skip]
    pub fn into_cliques(self) -> Vec<ScoredClique> { self.cliques }

    /// Number of recursive invocations, the root call included.
    #[must_use]
    #[rustfmt::skip]
    pub fn calls(&self) -> u64 { self.calls }

    /// Number of cliques that met the support threshold and were offered to
    /// the ranking queue.
    #[must_use]
    #[rustfmt::skip]
    pub fn offers(&self) -> u64 { self.offers }

    /// Why the search stopped.
    #[must_use]
    #[rustfmt::skip]
    pub fn termination(&self) -> Termination { self.termination }

    /// Wall-clock time spent searching.
    #[must_use]
    #[rustfmt::skip]
    pub fn elapsed(&self) -> Duration { self.elapsed }
}
