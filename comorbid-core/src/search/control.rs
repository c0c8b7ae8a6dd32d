//! Resource limits and the shared recursive-call counter.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use crate::{error::GraphError, result::Termination};

/// Number of calls between two wall-clock checks.
const DEADLINE_STRIDE: u64 = 64;

/// Cooperative cancellation flag shared between a caller and a running
/// search.
///
/// # Examples
/// ```
/// use comorbid_core::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every search observing this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Optional bounds on a single search.
///
/// Hitting a bound is not an error: the search returns the best cliques found
/// so far and reports the matching [`Termination`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use comorbid_core::SearchLimits;
///
/// let limits = SearchLimits::default()
///     .with_max_calls(10_000)
///     .with_time_limit(Duration::from_secs(5));
/// assert_eq!(limits.max_calls(), Some(10_000));
/// assert_eq!(limits.time_limit(), Some(Duration::from_secs(5)));
/// assert!(limits.cancellation().is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    max_calls: Option<u64>,
    time_limit: Option<Duration>,
    cancellation: Option<CancellationToken>,
}

impl SearchLimits {
    /// Limits the number of recursive invocations, the root call included.
    #[must_use]
    pub fn with_max_calls(mut self, max_calls: u64) -> Self {
        self.max_calls = Some(max_calls);
        self
    }

    /// Limits the wall-clock time spent searching.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Observes `token` for cooperative cancellation.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Configured call budget.
    #[must_use]
    #[rustfmt::skip]
    pub fn max_calls(&self) -> Option<u64> { self.max_calls }

    /// Configured time limit.
    #[must_use]
    #[rustfmt::skip]
    pub fn time_limit(&self) -> Option<Duration> { self.time_limit }

    /// Configured cancellation token.
    #[must_use]
    #[rustfmt::skip]
    pub fn cancellation(&self) -> Option<&CancellationToken> { self.cancellation.as_ref() }
}

/// Reason a recursion unwound before exhausting its branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Halt {
    Interrupted(Termination),
    Graph(GraphError),
}

impl From<GraphError> for Halt {
    fn from(error: GraphError) -> Self {
        Self::Graph(error)
    }
}

/// Per-search state shared by every session: the call counter and the stop
/// flag. Sessions running on different threads observe the same instance.
#[derive(Debug)]
pub(crate) struct SearchControl {
    calls: AtomicU64,
    stop: AtomicU8,
    max_calls: Option<u64>,
    deadline: Option<Instant>,
    cancellation: Option<CancellationToken>,
}

impl SearchControl {
    pub(crate) fn new(limits: &SearchLimits, started: Instant) -> Self {
        Self {
            calls: AtomicU64::new(0),
            stop: AtomicU8::new(0),
            max_calls: limits.max_calls,
            deadline: limits
                .time_limit
                .and_then(|limit| started.checked_add(limit)),
            cancellation: limits.cancellation.clone(),
        }
    }

    /// Accounts for one recursive invocation.
    ///
    /// Fails once any limit has been hit; the refused invocation is not
    /// counted, so the reported total never exceeds the call budget.
    pub(crate) fn enter(&self) -> Result<(), Halt> {
        if let Some(reason) = self.stopped() {
            return Err(Halt::Interrupted(reason));
        }
        let previous = self.calls.fetch_add(1, Ordering::Relaxed);
        if self.max_calls.is_some_and(|max| previous >= max) {
            self.calls.fetch_sub(1, Ordering::Relaxed);
            return Err(self.halt(Termination::CallBudgetExhausted));
        }
        if self
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            self.calls.fetch_sub(1, Ordering::Relaxed);
            return Err(self.halt(Termination::Cancelled));
        }
        if previous % DEADLINE_STRIDE == 0
            && self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.calls.fetch_sub(1, Ordering::Relaxed);
            return Err(self.halt(Termination::TimeLimitReached));
        }
        Ok(())
    }

    pub(crate) fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// The first limit that was hit, if any.
    pub(crate) fn stopped(&self) -> Option<Termination> {
        decode(self.stop.load(Ordering::Relaxed))
    }

    pub(crate) fn termination(&self) -> Termination {
        self.stopped().unwrap_or(Termination::Completed)
    }

    /// Records `reason` unless another limit was hit first, returning the
    /// halt carrying whichever reason won.
    fn halt(&self, reason: Termination) -> Halt {
        let winner = match self.stop.compare_exchange(
            0,
            encode(reason),
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => reason,
            Err(current) => decode(current).unwrap_or(reason),
        };
        Halt::Interrupted(winner)
    }
}

fn encode(reason: Termination) -> u8 {
    match reason {
        Termination::Completed => 0,
        Termination::CallBudgetExhausted => 1,
        Termination::TimeLimitReached => 2,
        Termination::Cancelled => 3,
    }
}

fn decode(raw: u8) -> Option<Termination> {
    match raw {
        1 => Some(Termination::CallBudgetExhausted),
        2 => Some(Termination::TimeLimitReached),
        3 => Some(Termination::Cancelled),
        _ => None,
    }
}
