//! Benchmark support crate for comorbid.
//!
//! Provides synthetic cohorts and parameter types used by the Criterion
//! benchmarks of the clique search.

pub mod error;
pub mod params;
pub mod synthetic;
