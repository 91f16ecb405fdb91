//! Performance history across stored artifacts.
//!
//! The collector only reads metadata documents from the artifact directory. It
//! tolerates a concurrent writer: files that vanish, fail to parse or lack the
//! supervised metrics are skipped with a warning and the scan carries on.

use crate::error::MlError;
use crate::metrics::schema::{PERFORMANCE_KEYS, PerformanceHistory};
use crate::model::registry::ArtifactFile;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a metadata file contributed no history record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Listed, but gone by the time it was opened.
    Vanished,
    Unreadable(String),
    InvalidJson(String),
    /// A supervised field is absent or not a number.
    MissingField(String),
    /// Evaluated without ground truth; the performance block is all null.
    Unsupervised,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vanished => write!(f, "file disappeared before it could be read"),
            Self::Unreadable(e) => write!(f, "unreadable: {e}"),
            Self::InvalidJson(e) => write!(f, "invalid JSON: {e}"),
            Self::MissingField(field) => write!(f, "missing numeric field `{field}`"),
            Self::Unsupervised => write!(f, "no ground-truth metrics recorded"),
        }
    }
}

/// A metadata file that was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryWarning {
    pub model_id: u64,
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Records sorted ascending by `index`, plus the files that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryReport {
    pub records: Vec<PerformanceHistory>,
    pub warnings: Vec<HistoryWarning>,
}

/// Scan `artifact_dir` for `model_id_<N>_info.json` documents and read back
/// their supervised metrics.
///
/// A missing directory is an empty history. Failing to list an existing
/// directory is a [`MlError::StorageUnavailable`].
pub fn collect_performance_history(artifact_dir: &Path) -> Result<HistoryReport, MlError> {
    let entries = match std::fs::read_dir(artifact_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HistoryReport::default()),
        Err(e) => return Err(MlError::storage(artifact_dir, e)),
    };

    let mut report = HistoryReport::default();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %artifact_dir.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        let Some(ArtifactFile::Metadata(model_id)) =
            entry.file_name().to_str().and_then(ArtifactFile::parse)
        else {
            continue;
        };

        let path = entry.path();
        match read_record(&path, model_id) {
            Ok(record) => report.records.push(record),
            Err(reason) => {
                tracing::warn!(model_id, path = %path.display(), %reason, "Skipping artifact metadata");
                report.warnings.push(HistoryWarning {
                    model_id,
                    path,
                    reason,
                });
            }
        }
    }

    report.records.sort_by_key(|r| r.index);
    report.warnings.sort_by_key(|w| w.model_id);
    tracing::debug!(
        records = report.records.len(),
        skipped = report.warnings.len(),
        "Collected performance history"
    );
    Ok(report)
}

fn read_record(path: &Path, model_id: u64) -> Result<PerformanceHistory, SkipReason> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SkipReason::Vanished,
        _ => SkipReason::Unreadable(e.to_string()),
    })?;
    let doc: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| SkipReason::InvalidJson(e.to_string()))?;

    let performance = doc
        .get("performance")
        .and_then(|p| p.as_object())
        .ok_or_else(|| SkipReason::MissingField("performance".to_string()))?;
    if performance.values().all(|v| v.is_null()) {
        if let Some(key) = PERFORMANCE_KEYS.iter().find(|k| !performance.contains_key(**k)) {
            return Err(SkipReason::MissingField(format!("performance.{key}")));
        }
        return Err(SkipReason::Unsupervised);
    }

    let field = |name: &str| {
        performance
            .get(name)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| SkipReason::MissingField(format!("performance.{name}")))
    };

    Ok(PerformanceHistory {
        index: model_id,
        roc_auc: field("roc_auc")?,
        pr_auc: field("pr_auc")?,
        f1: field("f1")?,
        log_loss: field("logloss")?,
    })
}
