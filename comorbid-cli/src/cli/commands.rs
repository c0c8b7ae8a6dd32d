//! Argument parsing and the `run` pipeline.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use comorbid_core::{
    CliqueSearch, Cohort, ComorbidityGraph, DiseaseId, ExecutionStrategy, GraphProvider,
    SearchError, SearchLimits, SearchReport,
};
use comorbid_providers_records::{EdgeList, PatientRecords, RecordsProviderError};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use super::output::write_csv;

const DEFAULT_SIZE_BOUND: usize = 3;
const DEFAULT_MIN_SUPPORT: usize = 100;
const DEFAULT_CAPACITY: usize = 100;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "comorbid",
    about = "Rank disease cliques by the share of their patients with the outcome."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Search a comorbidity network for lethal cliques.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// JSON object mapping patient ids to `[status, [disease, ...]]`.
    #[arg(long)]
    pub records: PathBuf,

    /// Edge list with one `source target [attributes]` entry per line.
    #[arg(long)]
    pub edges: PathBuf,

    /// Largest clique size to consider.
    #[arg(long = "size-bound", default_value_t = DEFAULT_SIZE_BOUND)]
    pub size_bound: usize,

    /// Fewest patients a clique must cover.
    #[arg(long = "min-support", default_value_t = DEFAULT_MIN_SUPPORT)]
    pub min_support: usize,

    /// Number of cliques to retain.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Disease every reported clique must contain; repeat for several.
    #[arg(long = "fixed", value_name = "DISEASE")]
    pub fixed: Vec<String>,

    /// Disease to drop before indexing; repeat for several.
    #[arg(long = "exclude", value_name = "DISEASE")]
    pub exclude: Vec<String>,

    /// Stop after this many recursive calls and report what was found.
    #[arg(long = "max-calls")]
    pub max_calls: Option<u64>,

    /// Stop after this many seconds and report what was found.
    #[arg(long = "time-limit-secs", value_name = "SECONDS")]
    pub time_limit_secs: Option<u64>,

    /// Explore top-level branches on the rayon thread pool.
    #[arg(long)]
    pub parallel: bool,

    /// Also write the ranking to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Override name for the graph (defaults to the edge list's file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading records or edges failed.
    #[error(transparent)]
    Records(#[from] RecordsProviderError),
    /// Configuring or running the search failed.
    #[error(transparent)]
    Core(#[from] SearchError),
    /// Writing the CSV export failed.
    #[error("failed to write `{path}`: {source}")]
    Export {
        /// Destination of the export.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}

impl CliError {
    /// Stable code of the underlying library error, if any.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::Records(error) => Some(error.code().as_str()),
            Self::Core(error) => Some(error.code().as_str()),
            Self::Export { .. } => None,
        }
    }
}

/// Everything the `run` command reports.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the searched graph.
    pub data_source: String,
    /// Number of patient records loaded.
    pub patients: usize,
    /// Number of outcome-positive patients.
    pub outcomes: usize,
    /// Diseases kept as graph nodes.
    pub nodes: usize,
    /// Edges kept between those diseases.
    pub edges: usize,
    /// Configured size bound.
    pub size_bound: usize,
    /// Configured support threshold.
    pub min_support: usize,
    /// Configured queue capacity.
    pub capacity: usize,
    /// Diseases every clique was seeded with.
    pub fixed: Vec<DiseaseId>,
    /// Time spent loading inputs and building the graph.
    pub preparation: Duration,
    /// Time spent searching.
    pub solving: Duration,
    /// Search outcome.
    pub report: SearchReport,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, searching or exporting fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use comorbid_cli::cli::{Cli, Command, RunCommand, run_cli};
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let records = dir.path().join("patients.json");
/// let edges = dir.path().join("network.edgelist");
/// std::fs::write(&records, r#"{"1": [1, ["a", "b"]], "2": [0, ["a"]]}"#)?;
/// std::fs::write(&edges, "a b {}\n")?;
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         records,
///         edges,
///         size_bound: 2,
///         min_support: 1,
///         capacity: 10,
///         fixed: Vec::new(),
///         exclude: Vec::new(),
///         max_calls: None,
///         time_limit_secs: None,
///         parallel: false,
///         csv: None,
///         name: None,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.report.cliques().len(), 3);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(
        size_bound = command.size_bound,
        min_support = command.min_support,
        parallel = command.parallel,
    ),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let search = configure_search(&command)?;

    let started = Instant::now();
    let inputs = prepare_inputs(&command)?;
    let preparation = started.elapsed();

    let started = Instant::now();
    let report = search.run_cohort(&inputs.graph, &inputs.cohort)?;
    let solving = started.elapsed();

    let summary = ExecutionSummary {
        data_source: inputs.graph.name().to_owned(),
        patients: inputs.patients,
        outcomes: inputs.cohort.outcomes().len(),
        nodes: inputs.graph.node_count(),
        edges: inputs.graph.edge_count(),
        size_bound: command.size_bound,
        min_support: command.min_support,
        capacity: command.capacity,
        fixed: search.fixed_nodes().to_vec(),
        preparation,
        solving,
        report,
    };
    if let Some(path) = &command.csv {
        export_csv(path, &summary)?;
    }

    info!(
        data_source = summary.data_source.as_str(),
        cliques = summary.report.cliques().len(),
        calls = summary.report.calls(),
        termination = %summary.report.termination(),
        "command completed"
    );
    Ok(summary)
}

pub(super) fn configure_search(command: &RunCommand) -> Result<CliqueSearch, CliError> {
    let mut limits = SearchLimits::default();
    if let Some(max_calls) = command.max_calls {
        limits = limits.with_max_calls(max_calls);
    }
    if let Some(seconds) = command.time_limit_secs {
        limits = limits.with_time_limit(Duration::from_secs(seconds));
    }
    let strategy = if command.parallel {
        ExecutionStrategy::Parallel
    } else {
        ExecutionStrategy::Sequential
    };
    Ok(CliqueSearch::builder()
        .with_size_bound(command.size_bound)
        .with_min_support(command.min_support)
        .with_capacity(command.capacity)
        .with_fixed_nodes(command.fixed.iter().map(|id| DiseaseId::from(id.as_str())))
        .with_execution_strategy(strategy)
        .with_limits(limits)
        .build()?)
}

pub(super) struct Inputs {
    pub(super) patients: usize,
    pub(super) cohort: Cohort,
    pub(super) graph: ComorbidityGraph,
}

#[instrument(
    name = "cli.prepare",
    err,
    skip(command),
    fields(records = %command.records.display(), edges = %command.edges.display()),
)]
pub(super) fn prepare_inputs(command: &RunCommand) -> Result<Inputs, CliError> {
    let excluded: BTreeSet<DiseaseId> = command
        .exclude
        .iter()
        .map(|id| DiseaseId::from(id.as_str()))
        .collect();
    let records = PatientRecords::from_path(&command.records)?;
    let patients = records.len();
    let cohort = records.into_cohort(&excluded)?;

    let name = derive_graph_name(&command.edges, command.name.as_deref());
    let graph = EdgeList::from_path(&command.edges)?.into_graph(name, cohort.outcome_diseases());
    info!(
        patients,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        excluded = excluded.len(),
        "inputs prepared"
    );
    Ok(Inputs {
        patients,
        cohort,
        graph,
    })
}

pub(super) fn derive_graph_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "graph".to_owned(), ToOwned::to_owned)
}

#[instrument(name = "cli.export_csv", err, skip(summary), fields(path = %path.display()))]
fn export_csv(path: &Path, summary: &ExecutionSummary) -> Result<(), CliError> {
    let export_error = |source| CliError::Export {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(export_error)?;
    let mut writer = BufWriter::new(file);
    write_csv(summary, &mut writer).map_err(export_error)?;
    writer.flush().map_err(export_error)
}
