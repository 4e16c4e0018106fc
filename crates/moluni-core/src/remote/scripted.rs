use std::collections::HashMap;
use std::sync::Mutex;

use super::{JobStatusSource, RemoteReport};
use crate::errors::QueryError;

/// Fuente remota con respuestas predefinidas por id.
///
/// Los ids sin respuesta configurada devuelven `QueryError::NotFound`.
#[derive(Debug, Default)]
pub struct ScriptedStatusSource {
    responses: HashMap<String, Result<RemoteReport, QueryError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedStatusSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, job_id: &str, response: Result<RemoteReport, QueryError>) -> Self {
        self.responses.insert(job_id.to_string(), response);
        self
    }

    /// Ids consultados hasta ahora, en orden de llegada.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl JobStatusSource for ScriptedStatusSource {
    fn query(&self, job_id: &str) -> Result<RemoteReport, QueryError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(job_id.to_string());
        }
        self.responses.get(job_id).cloned().unwrap_or(Err(QueryError::NotFound))
    }
}
