use indexmap::IndexMap;
use moluni_domain::{Calculation, Property};

use super::{check_row, ResultStore, UpsertOutcome};
use crate::errors::StoreError;

/// Store en memoria con la misma semántica que el backend Postgres.
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    calculations: IndexMap<String, Calculation>,
    properties: IndexMap<String, IndexMap<String, Property>>,
    unavailable: Option<String>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simula pérdida de conectividad: toda operación falla con
    /// `StoreError::Unavailable` hasta `restore`.
    pub fn set_unavailable(&mut self, reason: impl Into<String>) {
        self.unavailable = Some(reason.into());
    }

    pub fn restore(&mut self) {
        self.unavailable = None;
    }

    pub fn calculation_count(&self) -> usize {
        self.calculations.len()
    }

    pub fn property_count(&self) -> usize {
        self.properties.values().map(|p| p.len()).sum()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        match &self.unavailable {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl ResultStore for InMemoryResultStore {
    fn upsert_calculation(&mut self, row: &Calculation) -> Result<UpsertOutcome, StoreError> {
        self.check_available()?;
        check_row(row)?;
        match self.calculations.get_mut(&row.id) {
            None => {
                self.calculations.insert(row.id.clone(), row.clone());
                Ok(UpsertOutcome::Inserted)
            }
            Some(existing) if existing.status.is_terminal() => Ok(UpsertOutcome::AlreadyTerminal(existing.status)),
            Some(existing) if !existing.status.can_transition_to(row.status) => Ok(UpsertOutcome::Stale(existing.status)),
            Some(existing) => {
                existing.status = row.status;
                existing.completion_time = row.completion_time;
                if row.formula.is_some() {
                    existing.formula = row.formula.clone();
                }
                Ok(UpsertOutcome::Updated)
            }
        }
    }

    fn insert_properties(&mut self, calculation_id: &str, properties: &[Property]) -> Result<usize, StoreError> {
        self.check_available()?;
        if !self.calculations.contains_key(calculation_id) {
            return Err(StoreError::UnknownCalculation(calculation_id.to_string()));
        }
        let owned = self.properties.entry(calculation_id.to_string()).or_default();
        let mut inserted = 0;
        for p in properties {
            if !owned.contains_key(&p.name) {
                owned.insert(p.name.clone(), p.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    fn find_calculation(&self, id: &str) -> Result<Option<Calculation>, StoreError> {
        self.check_available()?;
        Ok(self.calculations.get(id).cloned())
    }

    fn list_properties(&self, calculation_id: &str) -> Result<Vec<Property>, StoreError> {
        self.check_available()?;
        Ok(self.properties.get(calculation_id).map(|p| p.values().cloned().collect()).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use moluni_domain::{CalculationStatus, CalculationType};

    use super::*;

    fn row(id: &str, status: CalculationStatus) -> Calculation {
        Calculation { id: id.into(),
                      input_descriptor: "O".into(),
                      formula: None,
                      calculation_type: CalculationType::Dft,
                      status,
                      submission_time: Utc::now(),
                      completion_time: status.is_terminal().then(Utc::now) }
    }

    #[test]
    fn upsert_inserts_then_updates_pending_rows() {
        let mut store = InMemoryResultStore::new();
        assert_eq!(store.upsert_calculation(&row("a", CalculationStatus::Running)).unwrap(), UpsertOutcome::Inserted);
        let mut done = row("a", CalculationStatus::Completed);
        done.formula = Some("H2O".into());
        assert_eq!(store.upsert_calculation(&done).unwrap(), UpsertOutcome::Updated);
        let stored = store.find_calculation("a").unwrap().unwrap();
        assert_eq!(stored.status, CalculationStatus::Completed);
        assert_eq!(stored.formula.as_deref(), Some("H2O"));
    }

    #[test]
    fn terminal_rows_are_never_overwritten() {
        let mut store = InMemoryResultStore::new();
        store.upsert_calculation(&row("a", CalculationStatus::Failed)).unwrap();
        let outcome = store.upsert_calculation(&row("a", CalculationStatus::Completed)).unwrap();
        assert_eq!(outcome, UpsertOutcome::AlreadyTerminal(CalculationStatus::Failed));
        assert_eq!(store.find_calculation("a").unwrap().unwrap().status, CalculationStatus::Failed);
    }

    #[test]
    fn pending_rows_never_move_backwards() {
        let mut store = InMemoryResultStore::new();
        store.upsert_calculation(&row("a", CalculationStatus::Running)).unwrap();
        let outcome = store.upsert_calculation(&row("a", CalculationStatus::Submitted)).unwrap();
        assert_eq!(outcome, UpsertOutcome::Stale(CalculationStatus::Running));
        assert!(!outcome.applied());
        assert_eq!(store.find_calculation("a").unwrap().unwrap().status, CalculationStatus::Running);
    }

    #[test]
    fn incoherent_rows_are_rejected() {
        let mut store = InMemoryResultStore::new();
        let mut done = row("a", CalculationStatus::Completed);
        done.completion_time = None;
        assert!(matches!(store.upsert_calculation(&done), Err(StoreError::InvalidRow(_))));
        let mut running = row("b", CalculationStatus::Running);
        running.completion_time = Some(Utc::now());
        assert!(matches!(store.upsert_calculation(&running), Err(StoreError::InvalidRow(_))));
        assert_eq!(store.calculation_count(), 0);
    }

    #[test]
    fn insert_properties_skips_duplicates_and_rejects_unknown() {
        let mut store = InMemoryResultStore::new();
        let err = store.insert_properties("ghost", &[Property::new("e", 1.0)]).unwrap_err();
        assert_eq!(err, StoreError::UnknownCalculation("ghost".into()));

        store.upsert_calculation(&row("a", CalculationStatus::Completed)).unwrap();
        let props = vec![Property::new("e", 1.0), Property::new("dipole", 0.5)];
        assert_eq!(store.insert_properties("a", &props).unwrap(), 2);
        let again = vec![Property::new("e", 9.0), Property::new("gap", 3.1)];
        assert_eq!(store.insert_properties("a", &again).unwrap(), 1);
        let listed = store.list_properties("a").unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed.iter().find(|p| p.name == "e").unwrap().value.as_number(), Some(1.0));
    }

    #[test]
    fn unavailable_store_fails_every_operation() {
        let mut store = InMemoryResultStore::new();
        store.set_unavailable("connection refused");
        assert!(matches!(store.upsert_calculation(&row("a", CalculationStatus::Error)), Err(StoreError::Unavailable(_))));
        store.restore();
        assert!(store.upsert_calculation(&row("a", CalculationStatus::Error)).is_ok());
    }
}
