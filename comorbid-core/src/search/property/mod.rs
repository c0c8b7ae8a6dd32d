//! Property-based tests for the clique search.
//!
//! Checks the search against an exhaustive oracle, validates the structural
//! invariants of every report and confirms that the parallel backend agrees
//! with the sequential walk, across graph shapes from edgeless to complete.

mod equivalence;
mod strategies;
mod structural;
mod types;
