use chrono::{TimeZone, Utc};
use moluni_domain::{CalculationStatus, CalculationType, LedgerEntry, Property, PropertyValue};
use serde_json::json;

#[test]
fn test_ledger_entry_reads_external_shape() {
    // Shape escrito por el submitter: campos mínimos sin fórmula
    let raw = json!({
        "id": "job-1",
        "input_descriptor": "O",
        "calculation_type": "dft",
        "status": "SUBMITTED",
        "submission_time": "2025-03-01T10:00:00Z"
    });
    let entry: LedgerEntry = serde_json::from_value(raw).unwrap();
    assert_eq!(entry.id, "job-1");
    assert_eq!(entry.status, CalculationStatus::Submitted);
    assert_eq!(entry.calculation_type, CalculationType::Dft);
    assert_eq!(entry.submission_time, Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());
    assert!(entry.formula.is_none());
}

#[test]
fn test_ledger_entry_rejects_unknown_status() {
    let raw = json!({
        "id": "job-1",
        "input_descriptor": "O",
        "calculation_type": "dft",
        "status": "DONE",
        "submission_time": "2025-03-01T10:00:00Z"
    });
    assert!(serde_json::from_value::<LedgerEntry>(raw).is_err());
}

#[test]
fn test_property_units_are_optional() {
    let p: Property = serde_json::from_value(json!({"name": "dipole", "value": 1.85})).unwrap();
    assert_eq!(p.value, PropertyValue::Number(1.85));
    assert!(p.units.is_none());

    let p: Property = serde_json::from_value(json!({"name": "point_group", "value": "C2v", "units": null})).unwrap();
    assert_eq!(p.value.as_text(), Some("C2v"));
}
