use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{CalculationStatus, DomainError};

/// Tipo de cálculo solicitado a la fuente remota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationType {
    /// Cálculo de energía de punto único (DFT).
    Dft,
    /// Dinámica molecular.
    Md,
}

impl CalculationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dft => "dft",
            Self::Md => "md",
        }
    }

    /// Parámetros por defecto que acompañan al bloque `calculation` del
    /// payload de envío.
    pub fn default_parameters(self) -> Value {
        match self {
            Self::Dft => json!({
                "functional": "PBE",
                "basis_set": "def2-SVP",
                "task": "single_point"
            }),
            Self::Md => json!({
                "ensemble": "NVT",
                "temperature": 300,
                "steps": 1000,
                "timestep": 1.0
            }),
        }
    }
}

impl fmt::Display for CalculationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dft" => Ok(Self::Dft),
            "md" => Ok(Self::Md),
            _ => Err(DomainError::UnknownCalculationType(s.to_string())),
        }
    }
}

/// Fila de la tabla `calculations`: un registro por job enviado.
///
/// `id`, `input_descriptor`, `calculation_type` y `submission_time` son
/// inmutables. `completion_time` se fija una sola vez, al entrar en un estado
/// terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub id: String,
    pub input_descriptor: String,
    pub formula: Option<String>,
    pub calculation_type: CalculationType,
    pub status: CalculationStatus,
    pub submission_time: DateTime<Utc>,
    pub completion_time: Option<DateTime<Utc>>,
}

impl Calculation {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Comprueba la coherencia estado/`completion_time`: los estados
    /// terminales llevan `completion_time`, los no terminales no.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.trim().is_empty() {
            return Err(DomainError::ValidationError("calculation id must not be empty".into()));
        }
        match (self.status.is_terminal(), self.completion_time) {
            (true, None) => Err(DomainError::ValidationError(format!("terminal calculation {} without completion_time", self.id))),
            (false, Some(_)) => Err(DomainError::ValidationError(format!("pending calculation {} with completion_time", self.id))),
            _ => Ok(()),
        }
    }
}
