//! Registro de envíos: prepara el payload, lo envía y deja la entrada
//! `Submitted` en el ledger.

use chrono::{DateTime, Utc};
use log::{error, info};
use moluni_domain::{CalculationStatus, CalculationType, LedgerEntry};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::errors::{LedgerError, QueryError};
use crate::ledger::Ledger;
use crate::remote::JobSubmitter;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("remote submission failed: {0}")]
    Remote(#[from] QueryError),
    /// El job se aceptó en remoto pero no pudo registrarse en el ledger.
    #[error("job {job_id} accepted remotely but not recorded: {source}")]
    Unrecorded {
        job_id: String,
        #[source]
        source: LedgerError,
    },
}

/// Datos del envío que acompañan al payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    pub calculation_type: CalculationType,
    /// Si falta se toma de `metadata.smiles` del payload.
    pub input_descriptor: Option<String>,
    /// Si falta se toma de `metadata.formula` del payload.
    pub formula: Option<String>,
}

/// Completa el bloque `calculation` del payload (tipo y parámetros por
/// defecto) si no viene ya informado.
pub fn prepare_payload(mut payload: Value, calculation_type: CalculationType) -> Result<Value, SubmitError> {
    let obj = payload.as_object_mut()
                     .ok_or_else(|| SubmitError::InvalidPayload("payload must be a JSON object".into()))?;
    let calc = obj.entry("calculation").or_insert_with(|| Value::Object(Map::new()));
    let calc = calc.as_object_mut()
                   .ok_or_else(|| SubmitError::InvalidPayload("`calculation` must be an object".into()))?;
    calc.entry("type").or_insert_with(|| json!(calculation_type.as_str()));
    calc.entry("parameters").or_insert_with(|| calculation_type.default_parameters());
    Ok(payload)
}

fn metadata_str(payload: &Value, key: &str) -> Option<String> {
    payload.get("metadata")
           .and_then(|m| m.get(key))
           .and_then(Value::as_str)
           .map(str::to_string)
}

/// Añade una entrada recién enviada al ledger. El estado siempre es
/// `Submitted`.
pub fn record_submission<L: Ledger>(ledger: &mut L, mut entry: LedgerEntry) -> Result<(), LedgerError> {
    entry.status = CalculationStatus::Submitted;
    let id = entry.id.clone();
    ledger.append(entry)?;
    info!("submit:recorded job_id={id}");
    Ok(())
}

/// Envía el payload y registra el job en el ledger.
pub fn submit_and_record<J: JobSubmitter, L: Ledger>(submitter: &J,
                                                     ledger: &mut L,
                                                     payload: Value,
                                                     request: &SubmissionRequest,
                                                     now: DateTime<Utc>)
                                                     -> Result<LedgerEntry, SubmitError> {
    let payload = prepare_payload(payload, request.calculation_type)?;
    let input_descriptor = request.input_descriptor
                                  .clone()
                                  .or_else(|| metadata_str(&payload, "smiles"))
                                  .ok_or_else(|| SubmitError::InvalidPayload("no input descriptor (metadata.smiles)".into()))?;
    let formula = request.formula.clone().or_else(|| metadata_str(&payload, "formula"));

    let job_id = submitter.submit(&payload)?;
    let mut entry = LedgerEntry::submitted(job_id.clone(), input_descriptor, request.calculation_type, now);
    entry.formula = formula;
    record_submission(ledger, entry.clone()).map_err(|source| {
                                                error!("submit:unrecorded job_id={job_id} err={source}");
                                                SubmitError::Unrecorded { job_id, source }
                                            })?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;

    struct FixedSubmitter(&'static str);

    impl JobSubmitter for FixedSubmitter {
        fn submit(&self, payload: &Value) -> Result<String, QueryError> {
            assert!(payload.get("calculation").is_some());
            Ok(self.0.to_string())
        }
    }

    fn request() -> SubmissionRequest {
        SubmissionRequest { calculation_type: CalculationType::Dft,
                            input_descriptor: None,
                            formula: None }
    }

    #[test]
    fn prepare_payload_keeps_explicit_calculation_block() {
        let p = prepare_payload(json!({"calculation": {"type": "md", "parameters": {"steps": 5}}}), CalculationType::Dft).unwrap();
        assert_eq!(p["calculation"]["type"], "md");
        assert_eq!(p["calculation"]["parameters"]["steps"], 5);

        let p = prepare_payload(json!({"molecule": {}}), CalculationType::Md).unwrap();
        assert_eq!(p["calculation"]["type"], "md");
        assert_eq!(p["calculation"]["parameters"]["temperature"], 300);

        assert!(prepare_payload(json!([1, 2]), CalculationType::Dft).is_err());
    }

    #[test]
    fn submit_records_entry_with_metadata_defaults() {
        let mut ledger = InMemoryLedger::new();
        let payload = json!({"metadata": {"smiles": "O", "formula": "H2O"}});
        let entry = submit_and_record(&FixedSubmitter("job-7"), &mut ledger, payload, &request(), Utc::now()).unwrap();
        assert_eq!(entry.input_descriptor, "O");
        assert_eq!(entry.formula.as_deref(), Some("H2O"));
        assert_eq!(ledger.get("job-7").unwrap().status, CalculationStatus::Submitted);
    }

    #[test]
    fn duplicate_job_id_is_reported_as_unrecorded() {
        let mut ledger = InMemoryLedger::new();
        let payload = json!({"metadata": {"smiles": "O"}});
        submit_and_record(&FixedSubmitter("job-7"), &mut ledger, payload.clone(), &request(), Utc::now()).unwrap();
        let err = submit_and_record(&FixedSubmitter("job-7"), &mut ledger, payload, &request(), Utc::now()).unwrap_err();
        assert!(matches!(err, SubmitError::Unrecorded { source: LedgerError::DuplicateId(_), .. }));
    }

    #[test]
    fn missing_descriptor_is_rejected_before_submitting() {
        let mut ledger = InMemoryLedger::new();
        let err = submit_and_record(&FixedSubmitter("job-8"), &mut ledger, json!({}), &request(), Utc::now()).unwrap_err();
        assert!(matches!(err, SubmitError::InvalidPayload(_)));
        assert!(ledger.load().unwrap().is_empty());
    }
}
