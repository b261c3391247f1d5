//! CLI command implementations.

pub mod inspect;
pub mod verify;

use prevail_core::snapshot::{DataSnapshot, IndexSnapshot};
use prevail_core::CoreError;
use prevail_storage::{Artifact, ArtifactStore, FileBackend};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors reported by the CLI itself.
#[derive(Debug, Error)]
pub enum CliError {
    /// No data artifact exists at the given path.
    #[error("no database found at {0:?}")]
    NotFound(PathBuf),

    /// Verification found problems.
    #[error("verification failed with {0} issue(s)")]
    VerificationFailed(usize),

    /// Unknown `--format` value.
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Output format shared by the reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(format: &str) -> Result<Self, CliError> {
        match format {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CliError::UnsupportedFormat(other.to_owned())),
        }
    }
}

/// State of the index artifact as read from disk.
#[derive(Debug)]
pub enum IndexArtifact {
    Missing,
    Corrupt(CoreError),
    Loaded(IndexSnapshot),
}

/// Both artifacts, decoded without any application types.
#[derive(Debug)]
pub struct RawArtifacts {
    pub data: DataSnapshot,
    pub data_size: u64,
    pub index: IndexArtifact,
    pub index_size: u64,
}

/// Reads both artifacts from `backend`.
///
/// A missing data artifact is `None`. A data artifact that does not decode
/// is an error; an index artifact that does not decode is reported as
/// [`IndexArtifact::Corrupt`] since the database rebuilds it on open.
pub fn read_artifacts(
    backend: &dyn ArtifactStore,
) -> Result<Option<RawArtifacts>, Box<dyn std::error::Error>> {
    let Some(data_bytes) = backend.read(Artifact::Data)? else {
        return Ok(None);
    };
    let data = DataSnapshot::decode(&data_bytes)?;

    let (index, index_size) = match backend.read(Artifact::Index)? {
        None => (IndexArtifact::Missing, 0),
        Some(bytes) => {
            let state = match IndexSnapshot::decode(&bytes) {
                Ok(snapshot) => IndexArtifact::Loaded(snapshot),
                Err(err) => IndexArtifact::Corrupt(err),
            };
            (state, bytes.len() as u64)
        }
    };
    debug!(records = data.records.len(), "read artifacts");

    Ok(Some(RawArtifacts {
        data,
        data_size: data_bytes.len() as u64,
        index,
        index_size,
    }))
}

/// Reads the artifacts stored next to the data file at `path`.
pub fn open_artifacts(path: &Path) -> Result<RawArtifacts, Box<dyn std::error::Error>> {
    let backend = FileBackend::new(path);
    read_artifacts(&backend)?.ok_or_else(|| CliError::NotFound(path.to_path_buf()).into())
}

#[cfg(test)]
pub(crate) mod test_support {
    use prevail_core::{Config, Database, Entity, Field, FieldValue};
    use prevail_storage::InMemoryBackend;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Human {
        pub name: String,
        pub city: String,
    }

    impl Entity for Human {
        const NAMESPACE: &'static str = "people";
        const NAME: &'static str = "Human";
        const FIELDS: &'static [Field<Self>] = &[
            Field::new("Name", |h: &Human| FieldValue::from(&h.name)),
            Field::new("City", |h: &Human| FieldValue::from(&h.city)),
        ];
    }

    pub fn human(name: &str, city: &str) -> Human {
        Human {
            name: name.into(),
            city: city.into(),
        }
    }

    /// Three humans indexed by city, saved to an in-memory disk.
    pub fn populated_disk() -> InMemoryBackend {
        let disk = InMemoryBackend::new();
        let config = Config::new().register::<Human>();
        let db = Database::open_with_backend(config, disk.clone()).unwrap();
        db.create_index_on::<Human>("City");
        db.set("alice", human("Alice", "Paris")).unwrap();
        db.set("bob", human("Bob", "Lyon")).unwrap();
        db.set("charlie", human("Charlie", "Paris")).unwrap();
        db.close().unwrap();
        disk
    }
}
