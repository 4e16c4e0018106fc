use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use moluni_domain::CalculationType;

#[derive(Parser, Debug)]
#[command(name = "moluni",
          version,
          about = "Seguimiento de cálculos remotos: envío, reconciliación de estado y registro de resultados.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Pending-jobs ledger file (default: $MOLUNI_LEDGER_PATH or results/pending_jobs.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub ledger: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll every pending job once and record terminal results.
    Reconcile(ReconcileArgs),
    /// Submit a prepared calculation payload and record the job as pending.
    Submit(SubmitArgs),
    /// List the jobs currently waiting in the ledger.
    Pending(PendingArgs),
    /// Create or update the result store schema.
    Migrate,
}

/// Remote API overrides shared by commands that talk to it.
#[derive(Args, Debug, Clone, Default)]
pub struct RemoteArgs {
    /// Remote calculation API base URL (default: $NVIDIA_NIM_API_URL)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Per-query timeout in seconds (default: $MOLUNI_QUERY_TIMEOUT_SECS or 30)
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Query pending jobs concurrently.
    #[arg(long)]
    pub parallel: bool,

    /// Archive each terminal remote document under this directory (default: $MOLUNI_RESULTS_DIR)
    #[arg(long, value_name = "DIR")]
    pub archive_dir: Option<PathBuf>,

    /// Print the pass report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// JSON payload prepared for the remote API.
    #[arg(short, long, value_name = "PATH")]
    pub payload: PathBuf,

    /// Calculation type.
    #[arg(long = "calc-type", value_parser = parse_calculation_type, default_value = "dft")]
    pub calc_type: CalculationType,

    /// Input descriptor (default: metadata.smiles of the payload).
    #[arg(long)]
    pub descriptor: Option<String>,

    /// Molecular formula (default: metadata.formula of the payload).
    #[arg(long)]
    pub formula: Option<String>,
}

#[derive(Args, Debug)]
pub struct PendingArgs {
    /// Print entries as JSON.
    #[arg(long)]
    pub json: bool,
}

fn parse_calculation_type(s: &str) -> Result<CalculationType, String> {
    s.parse().map_err(|e: moluni_domain::DomainError| e.to_string())
}
