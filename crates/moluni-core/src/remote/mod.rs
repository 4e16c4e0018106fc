//! Contrato de la fuente remota de estado de jobs.

mod scripted;

use moluni_domain::{CalculationStatus, Property};
use serde_json::Value;

use crate::errors::QueryError;

pub use scripted::ScriptedStatusSource;

/// Etiqueta de estado reportada por la fuente remota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    Submitted,
    Running,
    Completed,
    Failed,
    Error,
    /// Etiqueta no reconocida; se trata como pendiente.
    Unrecognized(String),
}

impl RemoteStatus {
    /// Interpreta la etiqueta textual del documento de estado
    /// (insensible a mayúsculas).
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "SUBMITTED" | "QUEUED" | "PENDING" => Self::Submitted,
            "RUNNING" | "IN_PROGRESS" => Self::Running,
            "COMPLETED" | "SUCCEEDED" => Self::Completed,
            "FAILED" => Self::Failed,
            "ERROR" => Self::Error,
            _ => Self::Unrecognized(tag.to_string()),
        }
    }

    /// Estado del dominio equivalente; `None` para etiquetas no reconocidas.
    pub fn as_calculation_status(&self) -> Option<CalculationStatus> {
        match self {
            Self::Submitted => Some(CalculationStatus::Submitted),
            Self::Running => Some(CalculationStatus::Running),
            Self::Completed => Some(CalculationStatus::Completed),
            Self::Failed => Some(CalculationStatus::Failed),
            Self::Error => Some(CalculationStatus::Error),
            Self::Unrecognized(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.as_calculation_status().is_some_and(|s| s.is_terminal())
    }
}

/// Respuesta de la fuente remota para un job.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteReport {
    pub status: RemoteStatus,
    pub formula: Option<String>,
    pub properties: Vec<Property>,
    /// Documento original, conservado para el archivo de resultados.
    pub raw: Option<Value>,
}

impl RemoteReport {
    /// Respuesta sin payload de resultados (pendiente o fallo terminal).
    pub fn status_only(status: RemoteStatus) -> Self {
        Self { status,
               formula: None,
               properties: Vec::new(),
               raw: None }
    }

    pub fn completed(formula: Option<String>, properties: Vec<Property>) -> Self {
        Self { status: RemoteStatus::Completed,
               formula,
               properties,
               raw: None }
    }
}

/// Fuente consultable por id de job.
///
/// `Sync` permite consultar entradas en paralelo dentro de una pasada.
pub trait JobStatusSource: Sync {
    fn query(&self, job_id: &str) -> Result<RemoteReport, QueryError>;
}

/// Envío de un payload de cálculo ya preparado; devuelve el id de job
/// asignado por la fuente remota.
pub trait JobSubmitter {
    fn submit(&self, payload: &Value) -> Result<String, QueryError>;
}
