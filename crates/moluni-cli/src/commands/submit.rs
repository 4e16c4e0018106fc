use std::fs;

use chrono::Utc;
use moluni_adapters::NimClient;
use moluni_core::{submit_and_record, JsonFileLedger, SubmissionRequest};
use serde_json::Value;

use crate::cli::SubmitArgs;
use crate::config::{remote_config, AppConfig};
use crate::error::{CliError, Result};

pub fn run(args: SubmitArgs, app: &AppConfig) -> Result<()> {
    let raw = fs::read_to_string(&args.payload).map_err(|source| CliError::Read { path: args.payload.clone(),
                                                                                   source })?;
    let payload: Value = serde_json::from_str(&raw).map_err(|source| CliError::Json { path: args.payload.clone(),
                                                                                       source })?;
    let client = NimClient::new(remote_config(&args.remote)?)?;
    let mut ledger = JsonFileLedger::new(&app.ledger_path);
    let request = SubmissionRequest { calculation_type: args.calc_type,
                                      input_descriptor: args.descriptor,
                                      formula: args.formula };
    let entry = submit_and_record(&client, &mut ledger, payload, &request, Utc::now())?;
    println!("{}", entry.id);
    Ok(())
}
