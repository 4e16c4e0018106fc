use indexmap::IndexMap;
use moluni_domain::LedgerEntry;

use super::{index_snapshot, Ledger};
use crate::errors::LedgerError;

/// Ledger en memoria (tests y ejecuciones efímeras).
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    inner: IndexMap<String, LedgerEntry>,
    replace_count: usize,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<LedgerEntry>) -> Result<Self, LedgerError> {
        Ok(Self { inner: index_snapshot(&entries)?,
                  replace_count: 0 })
    }

    /// Número de reescrituras completas aplicadas (diagnóstico en tests).
    pub fn replace_count(&self) -> usize {
        self.replace_count
    }

    pub fn get(&self, id: &str) -> Option<&LedgerEntry> {
        self.inner.get(id)
    }
}

impl Ledger for InMemoryLedger {
    fn load(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.inner.values().cloned().collect())
    }

    fn replace(&mut self, entries: &[LedgerEntry]) -> Result<(), LedgerError> {
        self.inner = index_snapshot(entries)?;
        self.replace_count += 1;
        Ok(())
    }
}
