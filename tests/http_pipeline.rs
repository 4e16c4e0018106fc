use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use moluni_rust::adapters::{NimClient, NimConfig};
use moluni_rust::pipeline::{InMemoryResultStore, ResultArchive};
use moluni_rust::{CalculationStatus, CalculationType, JsonFileLedger, Ledger, LedgerEntry, PassOptions, Reconciler, ResultStore};
use serde_json::json;

/// API falsa: atiende `requests` peticiones GET respondiendo por id.
fn fake_api(docs: HashMap<String, (u16, String)>, requests: usize) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        for stream in listener.incoming().take(requests) {
            let mut stream = stream.unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            // Consumir cabeceras (GET sin cuerpo)
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 2 {
                line.clear();
            }
            let path = request_line.split_whitespace().nth(1).unwrap_or_default();
            let id = path.rsplit('/').next().unwrap_or_default();
            let (code, body) = docs.get(id).cloned().unwrap_or((404, "{}".into()));
            let reason = if code == 200 { "OK" } else { "Error" };
            let response = format!("HTTP/1.1 {code} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                                   body.len());
            stream.write_all(response.as_bytes()).unwrap();
        }
    });
    (format!("http://{addr}/v1/infer"), handle)
}

#[test]
fn pass_over_http_records_results_and_archives_documents() {
    let dir = tempfile::tempdir().unwrap();
    let archive_dir = dir.path().join("results");
    let mut ledger = JsonFileLedger::new(dir.path().join("pending_jobs.json"));
    let now = chrono::Utc::now();
    for id in ["job-1", "job-2", "job-3", "job-4"] {
        ledger.append(LedgerEntry::submitted(id, "O", CalculationType::Dft, now)).unwrap();
    }

    let mut docs = HashMap::new();
    docs.insert("job-1".to_string(),
                (200,
                 json!({"job_id": "job-1", "status": "COMPLETED", "metadata": {"formula": "H2O"},
                        "properties": {"total_energy": {"value": -76.4, "units": "Hartree"}, "homo_lumo_gap": 9.1}}).to_string()));
    docs.insert("job-2".to_string(), (200, json!({"job_id": "job-2", "status": "RUNNING"}).to_string()));
    docs.insert("job-3".to_string(), (503, "{}".to_string()));
    docs.insert("job-4".to_string(), (200, json!({"job_id": "job-4", "status": "FAILED", "error": "scf"}).to_string()));
    let (base, server) = fake_api(docs, 4);

    let client = NimClient::new(NimConfig::new(base).with_timeout(Duration::from_secs(5))).unwrap();
    let options = PassOptions { parallel_queries: true,
                                archive: Some(ResultArchive::new(&archive_dir)) };
    let mut store = InMemoryResultStore::new();
    let report = Reconciler::new(client).with_options(options).run_pass(&mut ledger, &mut store).unwrap();
    server.join().unwrap();

    assert_eq!((report.newly_completed, report.newly_failed, report.still_pending, report.transient_errors), (1, 1, 2, 1));
    let job1 = store.find_calculation("job-1").unwrap().unwrap();
    assert_eq!(job1.formula.as_deref(), Some("H2O"));
    let props = store.list_properties("job-1").unwrap();
    assert_eq!(props.len(), 2);
    assert!(props.iter().any(|p| p.name == "total_energy" && p.units.as_deref() == Some("Hartree")));
    assert_eq!(store.find_calculation("job-4").unwrap().unwrap().status, CalculationStatus::Failed);

    let remaining: Vec<_> = ledger.load().unwrap().into_iter().map(|e| (e.id, e.status)).collect();
    assert_eq!(remaining,
               vec![("job-2".to_string(), CalculationStatus::Running), ("job-3".to_string(), CalculationStatus::Submitted)]);

    let archived: serde_json::Value = serde_json::from_slice(&std::fs::read(archive_dir.join("job-1.json")).unwrap()).unwrap();
    assert_eq!(archived["status"], "COMPLETED");
    assert!(archive_dir.join("job-4.json").exists());
    assert!(!archive_dir.join("job-2.json").exists());
}
