use log::{debug, info};
use moluni_adapters::NimClient;
use moluni_core::{JsonFileLedger, Ledger, PassOptions, PassReport, Reconciler, ResultArchive};
use moluni_persistence::{DbConfig, LazyPgResultStore};

use crate::cli::ReconcileArgs;
use crate::config::{remote_config, AppConfig};
use crate::error::Result;

/// Una pasada contra la API remota y el store Postgres.
///
/// El store se conecta en la primera escritura: con el ledger vacío la
/// pasada es un no-op aunque no haya base de datos configurada.
pub fn run(args: ReconcileArgs, app: &AppConfig) -> Result<()> {
    let client = NimClient::new(remote_config(&args.remote)?)?;
    let mut ledger = JsonFileLedger::new(&app.ledger_path);
    let mut store = match DbConfig::from_env() {
        Ok(cfg) => LazyPgResultStore::new(cfg),
        Err(e) if ledger.load()?.is_empty() => {
            debug!("reconcile: ledger vacío, base de datos sin configurar ({e})");
            LazyPgResultStore::from_env()
        }
        Err(e) => return Err(e.into()),
    };
    let options = PassOptions { parallel_queries: args.parallel,
                                archive: app.results_dir.clone().map(ResultArchive::new) };
    info!("reconcile: ledger={} api={}", app.ledger_path.display(), client.config().base_url);
    if let Some(archive) = &options.archive {
        info!("reconcile: archivo de documentos en {}", archive.dir().display());
    }

    let report = Reconciler::new(client).with_options(options).run_pass(&mut ledger, &mut store)?;
    debug!("reconcile: store conectado={}", store.is_connected());
    println!("{}", render_report(&report, args.json));
    Ok(())
}

pub fn render_report(report: &PassReport, json: bool) -> String {
    if json {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| report.to_string())
    } else {
        report.to_string()
    }
}
