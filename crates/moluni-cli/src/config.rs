//! Resolución de configuración: flags de la CLI sobre variables de entorno
//! (con `.env` cargado al arrancar) sobre valores por defecto.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use moluni_adapters::NimConfig;

use crate::cli::RemoteArgs;
use crate::error::{CliError, Result};

pub const DEFAULT_LEDGER_PATH: &str = "results/pending_jobs.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ledger_path: PathBuf,
    pub results_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn resolve(ledger_flag: Option<PathBuf>, archive_flag: Option<PathBuf>) -> Self {
        Self { ledger_path: ledger_flag.or_else(|| env_path("MOLUNI_LEDGER_PATH"))
                                       .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_PATH)),
               results_dir: archive_flag.or_else(|| env_path("MOLUNI_RESULTS_DIR")) }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var(key).ok().filter(|v| !v.trim().is_empty()).map(PathBuf::from)
}

/// Configuración del cliente remoto con los overrides de la línea de
/// comandos aplicados.
pub fn remote_config(args: &RemoteArgs) -> Result<NimConfig> {
    let cfg = NimConfig::from_env()?;
    apply_remote_overrides(cfg, args)
}

fn apply_remote_overrides(mut cfg: NimConfig, args: &RemoteArgs) -> Result<NimConfig> {
    if let Some(url) = &args.api_url {
        cfg.base_url = url.clone();
    }
    if let Some(secs) = args.timeout_secs {
        if secs == 0 {
            return Err(CliError::Config("--timeout-secs must be > 0".into()));
        }
        cfg.timeout = Duration::from_secs(secs);
    }
    Ok(cfg)
}
