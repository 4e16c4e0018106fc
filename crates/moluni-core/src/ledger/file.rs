use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use moluni_domain::LedgerEntry;

use super::{index_snapshot, Ledger};
use crate::errors::LedgerError;
use crate::fsio::write_atomic;

/// Ledger persistido como arreglo JSON en un archivo.
///
/// Las escrituras van a un temporal hermano y se renombran sobre el destino,
/// así que un crash a mitad de escritura deja el ledger anterior intacto.
#[derive(Debug, Clone)]
pub struct JsonFileLedger {
    path: PathBuf,
}

impl JsonFileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, reason: impl Into<String>) -> LedgerError {
        LedgerError::Corrupt { path: self.path.clone(),
                               reason: reason.into() }
    }
}

impl Ledger for JsonFileLedger {
    fn load(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("ledger:load path={} missing -> empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(LedgerError::Io { path: self.path.clone(),
                                             source })
            }
        };
        let entries: Vec<LedgerEntry> = serde_json::from_str(&raw).map_err(|e| self.corrupt(e.to_string()))?;
        // Un archivo que parsea pero rompe invariantes también es corrupto.
        index_snapshot(&entries).map_err(|e| self.corrupt(e.to_string()))?;
        debug!("ledger:load path={} count={}", self.path.display(), entries.len());
        Ok(entries)
    }

    fn replace(&mut self, entries: &[LedgerEntry]) -> Result<(), LedgerError> {
        index_snapshot(entries)?;
        let bytes = serde_json::to_vec_pretty(entries).map_err(|e| self.corrupt(format!("serialize: {e}")))?;
        write_atomic(&self.path, &bytes).map_err(|source| LedgerError::Io { path: self.path.clone(),
                                                                            source })?;
        debug!("ledger:replace path={} count={}", self.path.display(), entries.len());
        Ok(())
    }
}
