//! Escritura atómica de archivos: temporal en el mismo directorio + rename.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Escribe `bytes` en `path` de forma todo-o-nada.
///
/// El contenido se escribe en un temporal hermano, se sincroniza a disco y
/// se renombra sobre el destino; después se sincroniza el directorio para
/// que el rename sobreviva a un corte de energía. Un crash antes del rename
/// deja el archivo previo intacto.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::Builder::new().prefix(".moluni-").suffix(".tmp").tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    sync_dir(dir)
}

/// fsync de la entrada de directorio.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_and_leaves_no_temporaries() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out.json");
        write_atomic(&target, b"[1]").unwrap();
        write_atomic(&target, b"[2]").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "[2]");
        let leftovers: Vec<_> = fs::read_dir(target.parent().unwrap()).unwrap()
                                                                       .filter_map(|e| e.ok())
                                                                       .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
                                                                       .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn sync_dir_opens_the_directory_itself() {
        let dir = tempfile::tempdir().unwrap();
        sync_dir(dir.path()).unwrap();
        assert!(sync_dir(&dir.path().join("missing")).is_err());
    }
}
