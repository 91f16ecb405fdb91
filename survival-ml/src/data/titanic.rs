//! Titanic CSV parsing and preprocessing.
//!
//! Keeps `Pclass`, `Sex`, `Age`, `Fare` as features and `Survived` as the label.
//! `Sex` is encoded `male → 0`, `female → 1`. Rows with a missing or
//! unparseable value in any of those columns are dropped. Quoting and line
//! endings are handled by the `csv` reader.

use crate::data::Dataset;
use crate::error::MlError;

pub const LABEL_COLUMN: &str = "Survived";
pub const FEATURE_COLUMNS: [&str; 4] = ["Pclass", "Sex", "Age", "Fare"];

fn encode_sex(value: &str) -> Option<f64> {
    match value {
        "male" => Some(0.0),
        "female" => Some(1.0),
        _ => None,
    }
}

/// Parse and preprocess the raw Titanic CSV into a [`Dataset`].
pub fn parse_titanic_csv(text: &str) -> Result<Dataset, MlError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let header = reader
        .headers()
        .map_err(|e| MlError::dataset(format!("malformed CSV header: {e}")))?
        .clone();
    let column = |name: &str| header.iter().position(|h| h == name);

    let required: Vec<&str> = std::iter::once(LABEL_COLUMN).chain(FEATURE_COLUMNS).collect();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| column(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(MlError::dataset(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }
    let label_idx = column(LABEL_COLUMN).unwrap_or_default();
    let feature_idx: Vec<usize> = FEATURE_COLUMNS
        .iter()
        .map(|name| column(name).unwrap_or_default())
        .collect();

    let mut features = Vec::new();
    let mut labels = Vec::new();
    let mut dropped = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| MlError::dataset(format!("malformed CSV record: {e}")))?;
        let cell = |i: usize| record.get(i).filter(|v| !v.is_empty());

        let label = cell(label_idx).and_then(|v| match v {
            "0" => Some(0u8),
            "1" => Some(1u8),
            _ => None,
        });
        let row: Option<Vec<f64>> = FEATURE_COLUMNS
            .iter()
            .zip(&feature_idx)
            .map(|(&name, &i)| {
                let value = cell(i)?;
                if name == "Sex" {
                    encode_sex(value)
                } else {
                    value.parse::<f64>().ok().filter(|v| v.is_finite())
                }
            })
            .collect();

        match (label, row) {
            (Some(label), Some(row)) => {
                labels.push(label);
                features.push(row);
            }
            _ => dropped += 1,
        }
    }

    tracing::debug!(rows = labels.len(), dropped, "Preprocessed Titanic CSV");
    Dataset::new(
        FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        features,
        labels,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked\n\
1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25,,S\n\
2,1,1,\"Cumings, Mrs. John Bradley (Florence Briggs Thayer)\",female,38,1,0,PC 17599,71.2833,C85,C\n\
6,0,3,\"Moran, Mr. James\",male,,0,0,330877,8.4583,,Q\n\
10,1,2,\"Nasser, Mrs. Nicholas (\"\"Adele\"\" Achem)\",female,14,1,0,237736,30.0708,,C\n";

    #[test]
    fn test_parse_sample() {
        let ds = parse_titanic_csv(SAMPLE).unwrap();
        assert_eq!(ds.feature_names, vec!["Pclass", "Sex", "Age", "Fare"]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.labels, vec![0, 1, 1]);
        assert_eq!(ds.features[0], vec![3.0, 0.0, 22.0, 7.25]);
        assert_eq!(ds.features[1], vec![1.0, 1.0, 38.0, 71.2833]);
        assert_eq!(ds.features[2], vec![2.0, 1.0, 14.0, 30.0708]);
    }

    #[test]
    fn test_crlf_and_padded_cells() {
        let csv = "Survived, Pclass ,Sex,Age,Fare,Name\r\n1, 2 ,female, 31 ,20.5,\"Smith, Jane\"\r\n";
        let ds = parse_titanic_csv(csv).unwrap();
        assert_eq!(ds.labels, vec![1]);
        assert_eq!(ds.features[0], vec![2.0, 1.0, 31.0, 20.5]);
    }

    #[test]
    fn test_short_rows_are_dropped() {
        let csv = "Survived,Pclass,Sex,Age,Fare\n1,1,female\n0,3,male,40,8.05\n";
        let ds = parse_titanic_csv(csv).unwrap();
        assert_eq!(ds.labels, vec![0]);
    }

    #[test]
    fn test_missing_columns() {
        let err = parse_titanic_csv("Survived,Pclass,Sex\n1,1,female\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Dataset error: missing required columns: Age, Fare"
        );
    }

    #[test]
    fn test_unknown_sex_is_dropped() {
        let csv = "Survived,Pclass,Sex,Age,Fare\n1,1,unknown,30,10\n0,2,male,40,12.5\n";
        let ds = parse_titanic_csv(csv).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.features[0], vec![2.0, 0.0, 40.0, 12.5]);
    }

    #[test]
    fn test_empty_file() {
        assert!(parse_titanic_csv("").is_err());
    }
}
