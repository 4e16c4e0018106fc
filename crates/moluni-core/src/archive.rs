//! Archivo de documentos remotos terminales (`{dir}/{job_id}.json`).

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::fsio::write_atomic;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultArchive {
    dir: PathBuf,
}

impl ResultArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ruta del documento de un job. Los separadores de ruta del id se
    /// sustituyen para no escapar del directorio.
    pub fn path_for(&self, job_id: &str) -> PathBuf {
        let safe: String = job_id.chars()
                                 .map(|c| if c == '/' || c == '\\' || c == ':' { '_' } else { c })
                                 .collect();
        let safe = if safe.starts_with('.') { format!("_{safe}") } else { safe };
        self.dir.join(format!("{safe}.json"))
    }

    pub fn store(&self, job_id: &str, document: &Value) -> io::Result<PathBuf> {
        let path = self.path_for(job_id);
        let bytes = serde_json::to_vec_pretty(document).map_err(io::Error::other)?;
        write_atomic(&path, &bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn store_writes_pretty_json_named_after_job() {
        let dir = tempfile::tempdir().unwrap();
        let archive = ResultArchive::new(dir.path());
        let path = archive.store("job-1", &json!({"status": "COMPLETED"})).unwrap();
        assert_eq!(path, dir.path().join("job-1.json"));
        let back: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back["status"], "COMPLETED");
    }

    #[test]
    fn path_for_neutralises_separators() {
        let archive = ResultArchive::new("/tmp/results");
        assert_eq!(archive.path_for("../etc/passwd"), PathBuf::from("/tmp/results/_.._etc_passwd.json"));
        assert_eq!(archive.path_for("a/b"), PathBuf::from("/tmp/results/a_b.json"));
    }
}
