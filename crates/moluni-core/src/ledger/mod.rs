//! Ledger de recibos de envío: jobs en vuelo persistidos entre ejecuciones.

mod file;
mod memory;

use indexmap::IndexMap;
use moluni_domain::LedgerEntry;

use crate::errors::LedgerError;

pub use file::JsonFileLedger;
pub use memory::InMemoryLedger;

/// Colección ordenada de entradas no terminales.
///
/// Contrato:
/// - `load` devuelve una colección vacía si no hay ledger previo (primera
///   ejecución); un ledger ilegible es `LedgerError::Corrupt`.
/// - `replace` sobrescribe el ledger completo de forma atómica.
/// - `append` rechaza ids duplicados con `LedgerError::DuplicateId`.
pub trait Ledger {
    fn load(&self) -> Result<Vec<LedgerEntry>, LedgerError>;
    fn replace(&mut self, entries: &[LedgerEntry]) -> Result<(), LedgerError>;

    fn append(&mut self, entry: LedgerEntry) -> Result<(), LedgerError> {
        let mut entries = self.load()?;
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(LedgerError::DuplicateId(entry.id));
        }
        entries.push(entry);
        self.replace(&entries)
    }
}

/// Verifica las invariantes de un snapshot: ids únicos y ningún estado
/// terminal. Devuelve el snapshot indexado por id en el orden original.
pub(crate) fn index_snapshot(entries: &[LedgerEntry]) -> Result<IndexMap<String, LedgerEntry>, LedgerError> {
    let mut indexed = IndexMap::with_capacity(entries.len());
    for entry in entries {
        if entry.status.is_terminal() {
            return Err(LedgerError::TerminalEntry { id: entry.id.clone(),
                                                    status: entry.status });
        }
        if indexed.insert(entry.id.clone(), entry.clone()).is_some() {
            return Err(LedgerError::DuplicateId(entry.id.clone()));
        }
    }
    Ok(indexed)
}
