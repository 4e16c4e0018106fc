use std::fs;

use chrono::{TimeZone, Utc};
use moluni_core::{JsonFileLedger, Ledger, LedgerError};
use moluni_domain::{CalculationStatus, CalculationType, LedgerEntry};

fn entry(id: &str) -> LedgerEntry {
    LedgerEntry::submitted(id, "CCO", CalculationType::Dft, Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap())
}

#[test]
fn missing_ledger_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = JsonFileLedger::new(dir.path().join("pending_jobs.json"));
    assert!(ledger.load().unwrap().is_empty());
}

#[test]
fn replace_then_load_round_trips_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = JsonFileLedger::new(dir.path().join("sub").join("pending_jobs.json"));
    let mut running = entry("job-2").with_formula("C2H6O");
    running.status = CalculationStatus::Running;
    let entries = vec![entry("job-1"), running];
    ledger.replace(&entries).unwrap();
    assert_eq!(ledger.load().unwrap(), entries);
}

#[test]
fn append_rejects_duplicate_ids() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = JsonFileLedger::new(dir.path().join("pending_jobs.json"));
    ledger.append(entry("job-1")).unwrap();
    ledger.append(entry("job-2")).unwrap();
    let err = ledger.append(entry("job-1")).unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateId(ref id) if id == "job-1"));
    assert_eq!(ledger.load().unwrap().len(), 2);
}

#[test]
fn append_rejects_terminal_entries() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = JsonFileLedger::new(dir.path().join("pending_jobs.json"));
    let mut done = entry("job-1");
    done.status = CalculationStatus::Completed;
    assert!(matches!(ledger.append(done), Err(LedgerError::TerminalEntry { .. })));
    assert!(!ledger.path().exists());
}

#[test]
fn unreadable_ledger_is_corrupt_not_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pending_jobs.json");
    fs::write(&path, "[{\"id\": \"job-1\", \"trunc").unwrap();
    let ledger = JsonFileLedger::new(&path);
    assert!(matches!(ledger.load(), Err(LedgerError::Corrupt { .. })));
    // El archivo no se toca
    assert_eq!(fs::read_to_string(&path).unwrap(), "[{\"id\": \"job-1\", \"trunc");
}

#[test]
fn ledger_with_duplicate_ids_on_disk_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pending_jobs.json");
    fs::write(&path, serde_json::to_string(&vec![entry("job-1"), entry("job-1")]).unwrap()).unwrap();
    assert!(matches!(JsonFileLedger::new(&path).load(), Err(LedgerError::Corrupt { .. })));
}

#[test]
fn legacy_id_only_ledger_is_corrupt() {
    // Una lista de ids sin metadatos no permite reconstruir las entradas
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pending_jobs.json");
    fs::write(&path, "[\"job-1\", \"job-2\"]").unwrap();
    assert!(matches!(JsonFileLedger::new(&path).load(), Err(LedgerError::Corrupt { .. })));
}

#[test]
fn replace_with_empty_collection_leaves_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pending_jobs.json");
    let mut ledger = JsonFileLedger::new(&path);
    ledger.replace(&[entry("job-1")]).unwrap();
    ledger.replace(&[]).unwrap();
    assert!(ledger.load().unwrap().is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");
}
