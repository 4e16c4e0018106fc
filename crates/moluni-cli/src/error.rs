use std::path::PathBuf;

use moluni_adapters::AdapterError;
use moluni_core::{CoreError, LedgerError, SubmitError};
use moluni_persistence::PersistenceError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read '{path}': {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in '{path}': {source}", path = path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Reconciliation pass failed: {0}")]
    Pass(#[from] CoreError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

impl CliError {
    /// Código de salida del proceso.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Adapter(AdapterError::Config(_)) => 2,
            Self::Persistence(PersistenceError::Config(_)) => 2,
            Self::Ledger(_) | Self::Pass(CoreError::Ledger(_)) => 3,
            Self::Persistence(_) | Self::Pass(CoreError::Store(_)) => 4,
            _ => 1,
        }
    }
}
