//! Where the raw CSV comes from.

use crate::data::Dataset;
use crate::data::titanic::parse_titanic_csv;
use crate::error::MlError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Location of the raw Titanic CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DatasetSource {
    Url { url: String },
    File { path: PathBuf },
}

impl DatasetSource {
    /// `http://` and `https://` locations are URLs, anything else a local path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url {
                url: location.to_string(),
            }
        } else {
            Self::File {
                path: PathBuf::from(location),
            }
        }
    }

    /// Fetch the raw CSV text.
    pub async fn fetch(&self) -> Result<String, MlError> {
        match self {
            Self::Url { url } => {
                let response = reqwest::get(url).await?;
                if !response.status().is_success() {
                    return Err(MlError::dataset(format!(
                        "download of {url} failed with status {}",
                        response.status()
                    )));
                }
                Ok(response.text().await?)
            }
            Self::File { path } => tokio::fs::read_to_string(path).await.map_err(|e| {
                MlError::dataset(format!("failed to read {}: {e}", path.display()))
            }),
        }
    }
}

/// Fetch and preprocess the Titanic dataset.
pub async fn load_titanic(source: &DatasetSource) -> Result<Dataset, MlError> {
    let text = source.fetch().await?;
    let dataset = parse_titanic_csv(&text)?;
    tracing::info!(rows = dataset.len(), source = ?source, "Loaded Titanic dataset");
    Ok(dataset)
}
