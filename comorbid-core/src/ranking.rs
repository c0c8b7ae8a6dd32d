//! Bounded best-of-K retention of scored cliques.
//!
//! [`TopKQueue`] keeps a min-heap of at most `K` cliques so the eviction
//! candidate is always at the top, plus a set of canonical member keys so a
//! duplicate offer is detected without scanning the heap.
//!
//! Cliques are ranked by a total order: higher score first, then larger
//! support, then the lexicographically smaller member list. Because the
//! order is total, the retained set is the same whatever order the offers
//! arrive in, which lets per-worker queues be merged.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, HashSet},
    fmt,
    num::NonZeroUsize,
};

/// Outcome density of a support set, kept as an exact ratio.
///
/// Scores compare by cross multiplication, so `1/2` and `2/4` are equal and
/// no floating-point rounding enters the ranking.
///
/// # Examples
/// ```
/// use comorbid_core::Score;
///
/// let two_thirds = Score::new(2, 3).expect("support is non-empty");
/// let half = Score::new(1, 2).expect("support is non-empty");
/// assert!(two_thirds > half);
/// assert_eq!(Score::new(1, 2), Score::new(2, 4));
/// assert!((two_thirds.value() - 2.0 / 3.0).abs() < f64::EPSILON);
/// assert!(Score::new(1, 0).is_none());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Score {
    outcomes: usize,
    support: usize,
}

impl Score {
    /// Creates a score of `outcomes / support`.
    ///
    /// Returns `None` when `support` is zero or smaller than `outcomes`.
    #[must_use]
    pub fn new(outcomes: usize, support: usize) -> Option<Self> {
        (support > 0 && outcomes <= support).then_some(Self { outcomes, support })
    }

    /// Number of outcome-positive patients in the support set.
    #[must_use]
    #[rustfmt::skip]
    pub fn outcomes(&self) -> usize { self.outcomes }

    /// Size of the support set.
    #[must_use]
    #[rustfmt::skip]
    pub fn support(&self) -> usize { self.support }

    /// The score as a floating-point fraction in `[0, 1]`.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.outcomes as f64 / self.support as f64
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        let left = self.outcomes as u128 * other.support as u128;
        let right = other.outcomes as u128 * self.support as u128;
        left.cmp(&right)
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.outcomes, self.support)
    }
}

/// A clique held by the queue: sorted node indices and their score.
///
/// Ordering is "better is greater".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedClique {
    members: Vec<usize>,
    score: Score,
}

impl RankedClique {
    /// Creates a ranked clique, sorting and de-duplicating `members`.
    #[must_use]
    pub fn new(mut members: Vec<usize>, score: Score) -> Self {
        members.sort_unstable();
        members.dedup();
        Self { members, score }
    }

    /// Node indices, ascending.
    #[must_use]
    #[rustfmt::skip]
    pub fn members(&self) -> &[usize] { &self.members }

    /// Score of the clique's support set.
    #[must_use]
    #[rustfmt::skip]
    pub fn score(&self) -> Score { self.score }
}

fn rank(score: Score, members: &[usize], other_score: Score, other_members: &[usize]) -> Ordering {
    score
        .cmp(&other_score)
        .then_with(|| score.support.cmp(&other_score.support))
        .then_with(|| other_members.cmp(members))
}

impl Ord for RankedClique {
    fn cmp(&self, other: &Self) -> Ordering {
        rank(self.score, &self.members, other.score, &other.members)
    }
}

impl PartialOrd for RankedClique {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Decision taken by [`TopKQueue::offer`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Admission {
    /// The queue had room and the clique was added.
    Inserted,
    /// The clique displaced the worst retained entry.
    Replaced,
    /// The clique did not beat the worst retained entry.
    Rejected,
    /// An equal member set is already retained.
    Duplicate,
}

impl Admission {
    /// Returns `true` when the clique is now retained.
    #[must_use]
    pub const fn is_retained(self) -> bool {
        matches!(self, Self::Inserted | Self::Replaced)
    }
}

/// Retains the `K` best distinct cliques offered to it.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use comorbid_core::{Admission, Score, TopKQueue};
///
/// let mut queue = TopKQueue::new(NonZeroUsize::MIN);
/// let half = Score::new(1, 2).expect("valid score");
/// let full = Score::new(3, 3).expect("valid score");
/// assert_eq!(queue.offer(&[0, 1], half), Admission::Inserted);
/// assert_eq!(queue.offer(&[0, 1], full), Admission::Duplicate);
/// assert_eq!(queue.offer(&[2], full), Admission::Replaced);
/// let best = queue.drain();
/// assert_eq!(best.len(), 1);
/// assert_eq!(best[0].members(), &[2]);
/// ```
#[derive(Clone, Debug)]
pub struct TopKQueue {
    capacity: NonZeroUsize,
    heap: BinaryHeap<Reverse<RankedClique>>,
    keys: HashSet<Vec<usize>>,
}

impl TopKQueue {
    /// Creates an empty queue holding at most `capacity` cliques.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::new(),
            keys: HashSet::new(),
        }
    }

    /// Maximum number of retained cliques.
    #[must_use]
    #[rustfmt::skip]
    pub fn capacity(&self) -> NonZeroUsize { self.capacity }

    /// Number of retained cliques.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.heap.len() }

    /// Returns whether nothing is retained.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.heap.is_empty() }

    /// Returns whether the next admission must evict.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity.get()
    }

    /// The entry that would be evicted next.
    #[must_use]
    pub fn worst(&self) -> Option<&RankedClique> {
        self.heap.peek().map(|Reverse(entry)| entry)
    }

    /// Returns whether a member set equal to `members` is retained.
    ///
    /// `members` must be sorted ascending.
    #[must_use]
    pub fn contains(&self, members: &[usize]) -> bool {
        self.keys.contains(members)
    }

    /// Offers a clique given by its ascending member indices.
    ///
    /// The member slice is only copied when the clique is admitted.
    pub fn offer(&mut self, members: &[usize], score: Score) -> Admission {
        debug_assert!(members.windows(2).all(|pair| pair[0] < pair[1]));
        if self.keys.contains(members) {
            return Admission::Duplicate;
        }
        if !self.is_full() {
            self.push(members.to_vec(), score);
            return Admission::Inserted;
        }
        let beats_worst = self.worst().is_some_and(|worst| {
            rank(score, members, worst.score, &worst.members) == Ordering::Greater
        });
        if !beats_worst {
            return Admission::Rejected;
        }
        if let Some(Reverse(evicted)) = self.heap.pop() {
            self.keys.remove(&evicted.members);
        }
        self.push(members.to_vec(), score);
        Admission::Replaced
    }

    /// Re-offers every entry of `other`.
    pub fn merge(&mut self, other: Self) {
        for Reverse(entry) in other.heap {
            self.offer(&entry.members, entry.score);
        }
    }

    /// Consumes the queue, returning the retained cliques best-first.
    #[must_use]
    pub fn drain(self) -> Vec<RankedClique> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(entry)| entry)
            .collect()
    }

    fn push(&mut self, members: Vec<usize>, score: Score) {
        self.keys.insert(members.clone());
        self.heap.push(Reverse(RankedClique { members, score }));
    }
}
