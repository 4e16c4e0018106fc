//! Moluni Rust Library
//!
//! Fachada del workspace: re-exporta los crates para clientes que quieran
//! una sola dependencia.
//! - `domain`: modelo de cálculos, estados, propiedades y entradas del ledger.
//! - `pipeline`: ledger de jobs pendientes, contrato del store y reconciliador.
//! - `persistence`: store Postgres (Diesel).
//! - `adapters`: cliente HTTP de la API remota de cálculo.

pub use moluni_adapters as adapters;
pub use moluni_core as pipeline;
pub use moluni_domain as domain;
pub use moluni_persistence as persistence;

pub use moluni_core::{JsonFileLedger, Ledger, PassOptions, PassReport, Reconciler, ResultStore};
pub use moluni_domain::{Calculation, CalculationStatus, CalculationType, LedgerEntry, Property};
