//! File-based artifact store using write-temp-then-rename.

use crate::backend::{Artifact, ArtifactStore};
use crate::error::{StorageError, StorageResult};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix of the index artifact, appended to the data path.
pub const INDEX_SUFFIX: &str = ".index";
/// Suffix of staged copies, appended to the live path.
pub const TEMP_SUFFIX: &str = ".tmp";

/// On-disk locations of a snapshot's artifacts.
///
/// ```text
/// <path>              # data artifact
/// <path>.index        # index artifact
/// <path>.tmp          # staged data artifact
/// <path>.index.tmp    # staged index artifact
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Live data artifact.
    pub data: PathBuf,
    /// Live index artifact.
    pub index: PathBuf,
    /// Staged data artifact.
    pub data_temp: PathBuf,
    /// Staged index artifact.
    pub index_temp: PathBuf,
}

impl ArtifactPaths {
    /// Derives every artifact path from the data artifact path.
    #[must_use]
    pub fn new(data_path: &Path) -> Self {
        let index = with_suffix(data_path, INDEX_SUFFIX);
        Self {
            data: data_path.to_path_buf(),
            data_temp: with_suffix(data_path, TEMP_SUFFIX),
            index_temp: with_suffix(&index, TEMP_SUFFIX),
            index,
        }
    }

    /// Returns the live path of an artifact.
    #[must_use]
    pub fn live(&self, artifact: Artifact) -> &Path {
        match artifact {
            Artifact::Data => &self.data,
            Artifact::Index => &self.index,
        }
    }

    /// Returns the staging path of an artifact.
    #[must_use]
    pub fn temp(&self, artifact: Artifact) -> &Path {
        match artifact {
            Artifact::Data => &self.data_temp,
            Artifact::Index => &self.index_temp,
        }
    }
}

/// Appends a suffix to a path without touching its extension.
#[must_use]
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// A file-based artifact store.
///
/// # Durability
///
/// - `stage()` writes the staged file in full and, when `sync` is on,
///   calls `File::sync_all()` before returning
/// - `publish()` renames the staged file over the live one (atomic on
///   POSIX) and, when `sync` is on, fsyncs the parent directory so the
///   rename itself survives a crash
///
/// # Example
///
/// ```no_run
/// use prevail_storage::{Artifact, ArtifactStore, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::new(Path::new("people.db"));
/// backend.stage(Artifact::Data, b"snapshot bytes").unwrap();
/// backend.publish(Artifact::Data).unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    paths: ArtifactPaths,
    sync: bool,
}

impl FileBackend {
    /// Creates a file backend rooted at the given data artifact path.
    ///
    /// No file is touched until the first read or write.
    #[must_use]
    pub fn new(data_path: &Path) -> Self {
        Self {
            paths: ArtifactPaths::new(data_path),
            sync: true,
        }
    }

    /// Sets whether staged files and renames are fsynced.
    #[must_use]
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Returns the artifact paths.
    #[must_use]
    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    fn write_temp(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(data)?;
        if self.sync {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Syncs the parent directory so that renames are durable.
    ///
    /// Windows NTFS journals metadata operations; directory fsync is
    /// skipped there.
    #[cfg(unix)]
    fn sync_directory(&self) -> io::Result<()> {
        let parent = match self.paths.data.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        File::open(parent)?.sync_all()
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> io::Result<()> {
        Ok(())
    }
}

impl ArtifactStore for FileBackend {
    fn read(&self, artifact: Artifact) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(self.paths.live(artifact)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn stage(&mut self, artifact: Artifact, data: &[u8]) -> StorageResult<()> {
        let temp = self.paths.temp(artifact);
        debug!(path = %temp.display(), bytes = data.len(), "Staging {artifact} artifact");

        if let Err(source) = self.write_temp(temp, data) {
            warn!(path = %temp.display(), error = %source, "Stage failed, removing temp file");
            let _ = fs::remove_file(temp);
            return Err(StorageError::Stage { artifact, source });
        }
        Ok(())
    }

    fn publish(&mut self, artifact: Artifact) -> StorageResult<()> {
        let temp = self.paths.temp(artifact);
        let live = self.paths.live(artifact);

        match fs::rename(temp, live) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NothingStaged(artifact));
            }
            Err(source) => return Err(StorageError::Publish { artifact, source }),
        }

        if self.sync {
            self.sync_directory()
                .map_err(|source| StorageError::Publish { artifact, source })?;
        }

        debug!(path = %live.display(), "Published {artifact} artifact");
        Ok(())
    }

    fn discard(&mut self, artifact: Artifact) -> StorageResult<()> {
        remove_if_present(self.paths.temp(artifact))
    }

    fn remove(&mut self, artifact: Artifact) -> StorageResult<()> {
        remove_if_present(self.paths.live(artifact))
    }
}

fn remove_if_present(path: &Path) -> StorageResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn paths_follow_data_path() {
        let paths = ArtifactPaths::new(Path::new("/var/db/people.gob"));
        assert_eq!(paths.data, PathBuf::from("/var/db/people.gob"));
        assert_eq!(paths.index, PathBuf::from("/var/db/people.gob.index"));
        assert_eq!(paths.data_temp, PathBuf::from("/var/db/people.gob.tmp"));
        assert_eq!(paths.index_temp, PathBuf::from("/var/db/people.gob.index.tmp"));
    }

    #[test]
    fn read_missing_is_none() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("db"));
        assert!(backend.read(Artifact::Data).unwrap().is_none());
        assert!(backend.read(Artifact::Index).unwrap().is_none());
    }

    #[test]
    fn stage_does_not_touch_live() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(&dir.path().join("db"));

        backend.stage(Artifact::Data, b"v1").unwrap();
        backend.publish(Artifact::Data).unwrap();

        backend.stage(Artifact::Data, b"v2").unwrap();
        assert_eq!(backend.read(Artifact::Data).unwrap().unwrap(), b"v1");
        assert!(backend.paths().data_temp.exists());

        backend.publish(Artifact::Data).unwrap();
        assert_eq!(backend.read(Artifact::Data).unwrap().unwrap(), b"v2");
        assert!(!backend.paths().data_temp.exists());
    }

    #[test]
    fn publish_without_stage_fails() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(&dir.path().join("db"));
        let err = backend.publish(Artifact::Index).unwrap_err();
        assert!(matches!(err, StorageError::NothingStaged(Artifact::Index)));
    }

    #[test]
    fn discard_removes_staged_copy() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(&dir.path().join("db")).with_sync(false);

        backend.stage(Artifact::Index, b"idx").unwrap();
        backend.discard(Artifact::Index).unwrap();
        assert!(!backend.paths().index_temp.exists());

        // Discarding twice is fine.
        backend.discard(Artifact::Index).unwrap();
    }

    #[test]
    fn remove_live_artifact() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(&dir.path().join("db"));

        backend.stage(Artifact::Index, b"idx").unwrap();
        backend.publish(Artifact::Index).unwrap();
        backend.remove(Artifact::Index).unwrap();

        assert!(backend.read(Artifact::Index).unwrap().is_none());
        backend.remove(Artifact::Index).unwrap();
    }

    #[test]
    fn stage_into_missing_directory_fails_cleanly() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(&dir.path().join("missing").join("db"));

        let err = backend.stage(Artifact::Data, b"x").unwrap_err();
        assert!(matches!(
            err,
            StorageError::Stage {
                artifact: Artifact::Data,
                ..
            }
        ));
    }

    #[test]
    fn relative_data_path() {
        let backend = FileBackend::new(Path::new("db"));
        assert_eq!(backend.paths().index, PathBuf::from("db.index"));
    }
}
