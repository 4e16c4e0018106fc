use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Estado de una Calculation en el ciclo de vida del job remoto.
///
/// Las transiciones válidas son:
/// - `Submitted` -> `Running`
/// - `Submitted` | `Running` -> `Completed` | `Failed` | `Error`
///
/// Los estados terminales (`Completed`, `Failed`, `Error`) no cambian nunca
/// una vez fijados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationStatus {
    /// Job aceptado por la fuente remota, aún sin empezar.
    Submitted,
    /// Job en ejecución remota.
    Running,
    /// Job terminado con resultados.
    Completed,
    /// La fuente remota reportó que el cálculo falló.
    Failed,
    /// La fuente remota reportó un error definitivo del job.
    Error,
}

impl CalculationStatus {
    pub const ALL: [CalculationStatus; 5] = [Self::Submitted, Self::Running, Self::Completed, Self::Failed, Self::Error];

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Error)
    }

    /// Representación estable usada en el ledger y en la columna `status`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Error => "ERROR",
        }
    }

    /// Indica si pasar de `self` a `next` respeta la monotonicidad de estados.
    pub fn can_transition_to(self, next: CalculationStatus) -> bool {
        match (self, next) {
            (a, b) if a == b => true,
            (a, _) if a.is_terminal() => false,
            (Self::Running, Self::Submitted) => false,
            _ => true,
        }
    }
}

impl fmt::Display for CalculationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUBMITTED" => Ok(Self::Submitted),
            "RUNNING" => Ok(Self::Running),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            "ERROR" => Ok(Self::Error),
            _ => Err(DomainError::UnknownStatus(s.to_string())),
        }
    }
}
