use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Calculation, CalculationStatus, CalculationType};

/// Entrada del ledger de jobs en vuelo.
///
/// Invariante: sólo existen entradas para cálculos en estado no terminal. El
/// submitter las crea como `Submitted`; sólo el reconciliador las muta o
/// elimina.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub input_descriptor: String,
    pub calculation_type: CalculationType,
    pub status: CalculationStatus,
    pub submission_time: DateTime<Utc>,
    /// Fórmula conocida en el envío (opcional; la fuente remota puede
    /// aportarla después).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl LedgerEntry {
    pub fn submitted(id: impl Into<String>, input_descriptor: impl Into<String>, calculation_type: CalculationType, submission_time: DateTime<Utc>) -> Self {
        Self { id: id.into(),
               input_descriptor: input_descriptor.into(),
               calculation_type,
               status: CalculationStatus::Submitted,
               submission_time,
               formula: None }
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// Construye la fila terminal de la Calculation correspondiente a esta
    /// entrada. La fórmula remota tiene prioridad sobre la del envío.
    pub fn to_terminal_calculation(&self, status: CalculationStatus, formula: Option<String>, completion_time: DateTime<Utc>) -> Calculation {
        debug_assert!(status.is_terminal());
        Calculation { id: self.id.clone(),
                      input_descriptor: self.input_descriptor.clone(),
                      formula: formula.or_else(|| self.formula.clone()),
                      calculation_type: self.calculation_type,
                      status,
                      submission_time: self.submission_time,
                      completion_time: Some(completion_time) }
    }
}
