mod cli;
mod commands;
mod config;
mod error;
mod logging;

use clap::Parser;
use log::{debug, error};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::Result;

fn main() {
    // Cargar .env si existe (DATABASE_URL, NVIDIA_*, MOLUNI_*)
    moluni_persistence::init_dotenv();
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet);
    debug!("args: {cli:?}");

    if let Err(e) = run(cli) {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Reconcile(args) => {
            let app = AppConfig::resolve(cli.ledger, args.archive_dir.clone());
            commands::reconcile::run(args, &app)
        }
        Commands::Submit(args) => commands::submit::run(args, &AppConfig::resolve(cli.ledger, None)),
        Commands::Pending(args) => commands::pending::run(args, &AppConfig::resolve(cli.ledger, None)),
        Commands::Migrate => commands::migrate::run(),
    }
}
