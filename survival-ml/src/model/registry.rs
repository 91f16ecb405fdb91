//! Artifact registry: sequentially numbered model blobs with metrics metadata.
//!
//! Layout of the artifact directory:
//!
//! ```text
//! model_id_0.bin          bincode-encoded model
//! model_id_0_info.json    ArtifactMetadata (metrics + digest of the blob)
//! model_id_1.bin
//! ...
//! ```
//!
//! The registry is the only writer of this directory and assumes a single writer:
//! two processes saving at the same time can pick the same identifier.

use crate::config::MlConfig;
use crate::error::MlError;
use crate::metrics::monitoring::{HistoryReport, collect_performance_history};
use crate::metrics::schema::Metrics;
use crate::persistence::{atomic_write, atomic_write_json};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Version of the metadata document layout written by [`ArtifactRegistry::save`].
pub const SCHEMA_VERSION: u32 = 1;

const PREFIX: &str = "model_id_";
const MODEL_SUFFIX: &str = ".bin";
const METADATA_SUFFIX: &str = "_info.json";

/// A file name recognised by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFile {
    /// `model_id_<N>.bin`
    Model(u64),
    /// `model_id_<N>_info.json`
    Metadata(u64),
}

impl ArtifactFile {
    /// Parse a bare file name. Anything other than the two exact patterns with a
    /// plain decimal identifier is `None`.
    pub fn parse(file_name: &str) -> Option<Self> {
        let rest = file_name.strip_prefix(PREFIX)?;
        if let Some(digits) = rest.strip_suffix(METADATA_SUFFIX) {
            return parse_id(digits).map(Self::Metadata);
        }
        rest.strip_suffix(MODEL_SUFFIX)
            .and_then(parse_id)
            .map(Self::Model)
    }

    pub fn model_id(&self) -> u64 {
        match *self {
            Self::Model(id) | Self::Metadata(id) => id,
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            Self::Model(id) => format!("{PREFIX}{id}{MODEL_SUFFIX}"),
            Self::Metadata(id) => format!("{PREFIX}{id}{METADATA_SUFFIX}"),
        }
    }
}

fn parse_id(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Metadata document stored next to each model blob.
///
/// The metrics are flattened, so the document has `input`, `prediction` and
/// `performance` at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub schema_version: u32,
    pub model_id: u64,
    pub created_at: DateTime<Utc>,
    /// Hex SHA-256 of the model blob bytes.
    pub model_sha256: String,
    #[serde(flatten)]
    pub metrics: Metrics,
}

/// File-backed registry of trained models.
#[derive(Debug, Clone)]
pub struct ArtifactRegistry {
    dir: PathBuf,
}

impl ArtifactRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &MlConfig) -> Self {
        Self::new(config.paths.artifact_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_path(&self, model_id: u64) -> PathBuf {
        self.dir.join(ArtifactFile::Model(model_id).file_name())
    }

    pub fn metadata_path(&self, model_id: u64) -> PathBuf {
        self.dir.join(ArtifactFile::Metadata(model_id).file_name())
    }

    /// Identifiers of all stored model blobs, ascending.
    pub fn list(&self) -> Result<Vec<u64>, MlError> {
        let mut ids: Vec<u64> = self
            .scan()?
            .into_iter()
            .filter_map(|f| match f {
                ArtifactFile::Model(id) => Some(id),
                ArtifactFile::Metadata(_) => None,
            })
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// One past the highest identifier present, or 0 for an empty store.
    ///
    /// Orphaned metadata documents count too, so their identifier is not handed
    /// out again. A store already holding `u64::MAX` has no identifier left.
    pub fn next_identifier(&self) -> Result<u64, MlError> {
        match self.scan()?.iter().map(ArtifactFile::model_id).max() {
            None => Ok(0),
            Some(max) => max.checked_add(1).ok_or_else(|| {
                MlError::invalid_input(format!(
                    "identifier space exhausted in {}",
                    self.dir.display()
                ))
            }),
        }
    }

    /// Persist `model` and its evaluation `metrics` under a fresh identifier.
    ///
    /// The blob is written before the metadata. Each file is renamed into place
    /// whole, but the pair is not atomic: a crash in between leaves a blob with no
    /// metadata, which the history collector never sees.
    pub fn save<M: Serialize>(&self, model: &M, metrics: &Metrics) -> Result<u64, MlError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| MlError::storage(&self.dir, e))?;

        let model_id = self.next_identifier()?;
        let blob = bincode::serialize(model)?;
        let model_sha256 = format!("{:x}", Sha256::digest(&blob));

        let model_path = self.model_path(model_id);
        atomic_write(&model_path, &blob).map_err(|e| MlError::storage(&model_path, e))?;
        tracing::debug!(model_id, path = %model_path.display(), bytes = blob.len(), "Wrote model blob");

        let metadata = ArtifactMetadata {
            schema_version: SCHEMA_VERSION,
            model_id,
            created_at: Utc::now(),
            model_sha256,
            metrics: metrics.clone(),
        };
        let metadata_path = self.metadata_path(model_id);
        atomic_write_json(&metadata_path, &metadata)
            .map_err(|e| MlError::storage(&metadata_path, e))?;

        tracing::info!(model_id, dir = %self.dir.display(), "Saved model artifact");
        Ok(model_id)
    }

    /// Load the model stored under `model_id`.
    pub fn load<M: DeserializeOwned>(&self, model_id: u64) -> Result<M, MlError> {
        let blob = self.read(self.model_path(model_id), model_id)?;
        Ok(bincode::deserialize(&blob)?)
    }

    /// Load the metadata document stored under `model_id`.
    pub fn metadata(&self, model_id: u64) -> Result<ArtifactMetadata, MlError> {
        let content = self.read(self.metadata_path(model_id), model_id)?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// Whether the stored blob still matches the digest recorded in its metadata.
    pub fn verify(&self, model_id: u64) -> Result<bool, MlError> {
        let metadata = self.metadata(model_id)?;
        let blob = self.read(self.model_path(model_id), model_id)?;
        Ok(format!("{:x}", Sha256::digest(&blob)) == metadata.model_sha256)
    }

    /// Performance history of every artifact in this registry.
    pub fn history(&self) -> Result<HistoryReport, MlError> {
        collect_performance_history(&self.dir)
    }

    fn read(&self, path: PathBuf, model_id: u64) -> Result<Vec<u8>, MlError> {
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MlError::ArtifactNotFound(model_id),
            _ => MlError::Io(e),
        })
    }

    fn scan(&self) -> Result<Vec<ArtifactFile>, MlError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MlError::storage(&self.dir, e)),
        };
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MlError::storage(&self.dir, e))?;
            if let Some(file) = entry.file_name().to_str().and_then(ArtifactFile::parse) {
                files.push(file);
            }
        }
        Ok(files)
    }
}
