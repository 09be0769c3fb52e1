//! Filesystem primitives for the bootstrap gates.
//!
//! Every operation is idempotent: running it twice leaves the same state as running it once.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("{path} exists but is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of [`ensure_dir`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirStatus {
    Created,
    Existed,
}

/// Result of [`write_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Created,
    AlreadyExists,
}

/// Create `path` and any missing parents. An existing directory is left alone.
pub fn ensure_dir(path: &Path) -> Result<DirStatus, FsError> {
    if path.is_dir() {
        return Ok(DirStatus::Existed);
    }
    if path.exists() {
        return Err(FsError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    fs::create_dir_all(path).map_err(|source| FsError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Created directory {}", path.display());
    Ok(DirStatus::Created)
}

/// [`ensure_dir`] for each path, in order; stops at the first failure.
pub fn ensure_dirs(paths: &[PathBuf]) -> Result<Vec<(PathBuf, DirStatus)>, FsError> {
    paths
        .iter()
        .map(|p| ensure_dir(p).map(|status| (p.clone(), status)))
        .collect()
}

/// Write `contents` to `path` only if nothing exists there yet.
///
/// The content goes to a temporary file in the destination directory first and is then
/// renamed into place without replacing an existing file. Readers never see a partial file,
/// and when two writers race, the first one wins and the other reports `AlreadyExists`.
pub fn write_if_absent(path: &Path, contents: &[u8]) -> Result<WriteStatus, FsError> {
    if path.exists() {
        return Ok(WriteStatus::AlreadyExists);
    }

    let write_err = |source| FsError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    ensure_dir(&parent)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".researchflow-")
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(WriteStatus::Created),
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
            tracing::debug!("{} appeared concurrently; keeping it", path.display());
            Ok(WriteStatus::AlreadyExists)
        }
        Err(e) => Err(write_err(e.error)),
    }
}

/// Paths from `paths` that do not exist, in input order.
pub fn missing_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths.iter().filter(|p| !p.exists()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_creates_parents_then_reports_existing() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        assert_eq!(ensure_dir(&nested).unwrap(), DirStatus::Created);
        assert!(nested.is_dir());
        assert_eq!(ensure_dir(&nested).unwrap(), DirStatus::Existed);
    }

    #[test]
    fn test_ensure_dir_rejects_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("data");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            ensure_dir(&file),
            Err(FsError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_ensure_dirs_in_order() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("models")).unwrap();
        let out = ensure_dirs(&[tmp.path().join("data"), tmp.path().join("models")]).unwrap();
        assert_eq!(out[0].1, DirStatus::Created);
        assert_eq!(out[1].1, DirStatus::Existed);
    }

    #[test]
    fn test_write_if_absent_creates_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data").join("kb.json");

        assert_eq!(write_if_absent(&path, b"[1]").unwrap(), WriteStatus::Created);
        assert_eq!(fs::read(&path).unwrap(), b"[1]");

        assert_eq!(
            write_if_absent(&path, b"[2]").unwrap(),
            WriteStatus::AlreadyExists
        );
        assert_eq!(fs::read(&path).unwrap(), b"[1]");
    }

    #[test]
    fn test_write_if_absent_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kb.json");
        write_if_absent(&path, b"{}").unwrap();
        write_if_absent(&path, b"{}").unwrap();

        let names: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["kb.json".to_string()]);
    }

    #[test]
    fn test_concurrent_writers_never_truncate() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kb.json");
        let payload = vec![b'a'; 64 * 1024];

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let path = path.clone();
                let payload = payload.clone();
                std::thread::spawn(move || write_if_absent(&path, &payload).unwrap())
            })
            .collect();
        let results: Vec<WriteStatus> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(
            results.iter().filter(|s| **s == WriteStatus::Created).count(),
            1
        );
        assert_eq!(fs::read(&path).unwrap(), payload);
    }

    #[test]
    fn test_missing_paths() {
        let tmp = TempDir::new().unwrap();
        let present = tmp.path().join("config.py");
        fs::write(&present, "").unwrap();
        let absent = tmp.path().join("main.py");
        assert_eq!(missing_paths(&[present, absent.clone()]), vec![absent]);
    }
}
