//! Contrato del store estructurado de resultados (tablas `calculations` y
//! `properties`) y su implementación en memoria.

mod memory;

use moluni_domain::{Calculation, CalculationStatus, Property};

use crate::errors::StoreError;

pub use memory::InMemoryResultStore;

/// Valida una fila antes de escribirla.
pub fn check_row(row: &Calculation) -> Result<(), StoreError> {
    row.validate().map_err(|e| StoreError::InvalidRow(e.to_string()))
}

/// Resultado de `upsert_calculation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// La fila no existía y se creó.
    Inserted,
    /// La fila existía en estado no terminal y se actualizó.
    Updated,
    /// La fila ya era terminal: no se tocó (no-op idempotente).
    AlreadyTerminal(CalculationStatus),
    /// La fila existente va por delante (p. ej. `Running` frente a un
    /// `Submitted` atrasado): no se tocó.
    Stale(CalculationStatus),
}

impl UpsertOutcome {
    pub fn applied(self) -> bool {
        matches!(self, Self::Inserted | Self::Updated)
    }
}

/// Resumen de una escritura terminal (fila + propiedades).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalWrite {
    pub upsert: UpsertOutcome,
    pub properties_inserted: usize,
}

/// Store append/upsert de cálculos y propiedades. Nunca borra registros
/// completados.
pub trait ResultStore {
    /// Crea la fila si el id es desconocido; si existe y no es terminal
    /// actualiza `status`, `formula` (si viene) y `completion_time`. Una fila
    /// terminal nunca se sobrescribe y el estado nunca retrocede (`Stale`).
    /// Una fila incoherente (`Calculation::validate`) es
    /// `StoreError::InvalidRow`.
    fn upsert_calculation(&mut self, row: &Calculation) -> Result<UpsertOutcome, StoreError>;

    /// Inserta propiedades omitiendo (sin error) los nombres ya presentes.
    /// Devuelve cuántas filas nuevas se insertaron.
    /// Falla con `StoreError::UnknownCalculation` si la fila no existe.
    fn insert_properties(&mut self, calculation_id: &str, properties: &[Property]) -> Result<usize, StoreError>;

    fn find_calculation(&self, id: &str) -> Result<Option<Calculation>, StoreError>;

    fn list_properties(&self, calculation_id: &str) -> Result<Vec<Property>, StoreError>;

    /// Registra un resultado terminal: upsert de la fila y, si el cálculo
    /// quedó `Completed`, sus propiedades. Los backends transaccionales deben
    /// sobrescribirlo para que ambas escrituras sean atómicas.
    fn record_terminal(&mut self, row: &Calculation, properties: &[Property]) -> Result<TerminalWrite, StoreError> {
        let upsert = self.upsert_calculation(row)?;
        let properties_inserted = if should_insert_properties(row, upsert) && !properties.is_empty() {
            self.insert_properties(&row.id, properties)?
        } else {
            0
        };
        Ok(TerminalWrite { upsert,
                           properties_inserted })
    }
}

/// Las propiedades sólo pertenecen a cálculos `Completed`. Si la fila ya era
/// terminal y `Completed` se re-entregan (los duplicados se omiten), lo que
/// repara una escritura previa interrumpida entre fila y propiedades.
pub fn should_insert_properties(row: &Calculation, upsert: UpsertOutcome) -> bool {
    if row.status != CalculationStatus::Completed {
        return false;
    }
    match upsert {
        UpsertOutcome::Inserted | UpsertOutcome::Updated => true,
        UpsertOutcome::AlreadyTerminal(existing) => existing == CalculationStatus::Completed,
        UpsertOutcome::Stale(_) => false,
    }
}
