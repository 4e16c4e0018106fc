use std::fmt;

use chrono::{DateTime, Utc};
use moluni_domain::CalculationStatus;
use serde::Serialize;
use uuid::Uuid;

use crate::store::UpsertOutcome;

/// Conteos de una pasada de reconciliación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub pass_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Entradas que quedan en el ledger (incluye las reintentadas).
    pub still_pending: usize,
    /// De `still_pending`, cuántas por error transitorio de consulta.
    pub transient_errors: usize,
    pub newly_completed: usize,
    pub newly_failed: usize,
    /// Resultados terminales cuya fila ya era terminal en el store.
    pub already_recorded: usize,
}

impl PassReport {
    pub fn new(pass_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self { pass_id,
               started_at,
               still_pending: 0,
               transient_errors: 0,
               newly_completed: 0,
               newly_failed: 0,
               already_recorded: 0 }
    }

    pub(crate) fn tally_terminal(&mut self, status: CalculationStatus, upsert: UpsertOutcome) {
        if !upsert.applied() {
            self.already_recorded += 1;
        } else if status == CalculationStatus::Completed {
            self.newly_completed += 1;
        } else {
            self.newly_failed += 1;
        }
    }

    /// Entradas que salieron del ledger en esta pasada.
    pub fn removed(&self) -> usize {
        self.newly_completed + self.newly_failed + self.already_recorded
    }

    pub fn is_noop(&self) -> bool {
        self.still_pending == 0 && self.removed() == 0
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
               "pass {}: pending={} (transient_errors={}) completed={} failed={} already_recorded={}",
               self.pass_id,
               self.still_pending,
               self.transient_errors,
               self.newly_completed,
               self.newly_failed,
               self.already_recorded)
    }
}
