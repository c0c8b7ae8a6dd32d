//! Shared test utilities used across comorbid crates.

pub mod ci;
pub mod tracing;
