use chrono::{DateTime, Utc};
use moluni_domain::{Calculation, CalculationStatus, LedgerEntry, Property};
use serde_json::Value;

use crate::errors::QueryError;
use crate::remote::{RemoteReport, RemoteStatus};

/// Resultado de procesar una entrada del ledger en una pasada.
///
/// Cada entrada produce exactamente un valor; la pasada los recoge en lote
/// para decidir escrituras en el store y el nuevo ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    /// Sigue pendiente en remoto. `changed` indica si el estado del ledger
    /// avanzó (p. ej. `Submitted` -> `Running`).
    Pending { entry: LedgerEntry, changed: bool },
    /// La consulta falló de forma transitoria: la entrada se conserva intacta.
    Retry { entry: LedgerEntry, error: QueryError },
    /// Estado terminal: hay que registrar `calculation` (y `properties` si
    /// está completado) antes de sacar la entrada del ledger.
    Terminal {
        entry: LedgerEntry,
        calculation: Calculation,
        properties: Vec<Property>,
        raw: Option<Value>,
    },
}

impl EntryOutcome {
    pub fn job_id(&self) -> &str {
        match self {
            Self::Pending { entry, .. } | Self::Retry { entry, .. } | Self::Terminal { entry, .. } => &entry.id,
        }
    }

    /// Entrada que sobrevive en el ledger, si la hay.
    pub fn surviving_entry(&self) -> Option<&LedgerEntry> {
        match self {
            Self::Pending { entry, .. } | Self::Retry { entry, .. } => Some(entry),
            Self::Terminal { .. } => None,
        }
    }
}

/// Clasifica la respuesta remota de una entrada.
///
/// - Error de consulta -> `Retry` (nunca terminal).
/// - `Submitted`/`Running`/no reconocido -> `Pending`; el estado sólo avanza.
/// - `Completed` -> `Terminal` con propiedades.
/// - `Failed`/`Error` -> `Terminal` sin propiedades.
pub fn classify(entry: &LedgerEntry, response: Result<RemoteReport, QueryError>, now: DateTime<Utc>) -> EntryOutcome {
    let report = match response {
        Ok(report) => report,
        Err(error) => {
            return EntryOutcome::Retry { entry: entry.clone(),
                                         error }
        }
    };
    match report.status {
        RemoteStatus::Completed => {
            let calculation = entry.to_terminal_calculation(CalculationStatus::Completed, report.formula, now);
            EntryOutcome::Terminal { entry: entry.clone(),
                                     calculation,
                                     properties: report.properties,
                                     raw: report.raw }
        }
        RemoteStatus::Failed | RemoteStatus::Error => {
            let status = if report.status == RemoteStatus::Failed { CalculationStatus::Failed } else { CalculationStatus::Error };
            let calculation = entry.to_terminal_calculation(status, report.formula, now);
            EntryOutcome::Terminal { entry: entry.clone(),
                                     calculation,
                                     properties: Vec::new(),
                                     raw: report.raw }
        }
        RemoteStatus::Running if entry.status != CalculationStatus::Running => {
            let mut updated = entry.clone();
            updated.status = CalculationStatus::Running;
            EntryOutcome::Pending { entry: updated,
                                    changed: true }
        }
        RemoteStatus::Submitted | RemoteStatus::Running | RemoteStatus::Unrecognized(_) => EntryOutcome::Pending { entry: entry.clone(),
                                                                                                                    changed: false },
    }
}
