//! Errores del core: ledger, store, fuente remota y fallos a nivel de pasada.

use std::path::PathBuf;

use moluni_domain::CalculationStatus;
use thiserror::Error;

/// Errores del ledger de jobs pendientes.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// El archivo existe pero no es un ledger válido. Nunca se sustituye por
    /// un ledger vacío.
    #[error("ledger at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("duplicate ledger id: {0}")]
    DuplicateId(String),
    #[error("ledger entry {id} has terminal status {status}")]
    TerminalEntry { id: String, status: CalculationStatus },
}

/// Errores del store estructurado de resultados.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Se intentó insertar propiedades de un cálculo inexistente.
    #[error("unknown calculation: {0}")]
    UnknownCalculation(String),
    /// La fila no respeta la coherencia estado/`completion_time`.
    #[error("invalid calculation row: {0}")]
    InvalidRow(String),
    /// Conexión / pool no disponible.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Errores al consultar la fuente remota. Todos son transitorios para el
/// reconciliador: la entrada se conserva para la siguiente pasada.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("status query timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rate limited by remote source")]
    RateLimited,
    #[error("job not found at remote source")]
    NotFound,
    #[error("unauthorized by remote source")]
    Unauthorized,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Fallo a nivel de pasada: la pasada aborta sin reescribir el ledger.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
