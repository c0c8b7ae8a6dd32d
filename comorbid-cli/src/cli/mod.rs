//! Command-line interface for lethal-clique searches.
//!
//! `run` loads patient records and a comorbidity edge list, restricts the
//! graph to diseases seen in outcome-positive patients and reports the
//! best-scoring cliques.

mod commands;
mod output;

pub use commands::{Cli, CliError, Command, ExecutionSummary, RunCommand, run_cli};
pub use output::{render_summary, write_csv};
