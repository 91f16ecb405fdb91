//! Metric and history records.
//!
//! The serialized shape is the metadata contract read back by the history
//! collector: nested `input`, `prediction` and `performance` objects with
//! snake_case fields. Label-derived fields are written as explicit `null`s when
//! no ground truth was available, and are either all present or all null.

use serde::{Deserialize, Serialize};

/// Counts and rate of the positive class within a label sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassBalance {
    pub positive_count: usize,
    pub negative_count: usize,
    pub positive_rate: f64,
}

/// Describes the evaluation batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InputFields", into = "InputFields")]
pub struct InputMetrics {
    pub batch_size: usize,
    /// Balance of the ground-truth labels, when they were supplied.
    pub ground_truth: Option<ClassBalance>,
}

#[derive(Serialize, Deserialize)]
struct InputFields {
    batch_size: usize,
    positive_count: Option<usize>,
    negative_count: Option<usize>,
    positive_rate: Option<f64>,
}

impl From<InputMetrics> for InputFields {
    fn from(m: InputMetrics) -> Self {
        Self {
            batch_size: m.batch_size,
            positive_count: m.ground_truth.map(|b| b.positive_count),
            negative_count: m.ground_truth.map(|b| b.negative_count),
            positive_rate: m.ground_truth.map(|b| b.positive_rate),
        }
    }
}

impl TryFrom<InputFields> for InputMetrics {
    type Error = String;

    fn try_from(f: InputFields) -> Result<Self, Self::Error> {
        let ground_truth = match (f.positive_count, f.negative_count, f.positive_rate) {
            (Some(positive_count), Some(negative_count), Some(positive_rate)) => {
                Some(ClassBalance {
                    positive_count,
                    negative_count,
                    positive_rate,
                })
            }
            (None, None, None) => None,
            _ => return Err("input metrics are partially populated".to_string()),
        };
        Ok(Self {
            batch_size: f.batch_size,
            ground_truth,
        })
    }
}

/// Describes the model output distribution; always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionMetrics {
    pub positive_rate: f64,
    pub positive_count: usize,
    pub negative_count: usize,
    pub min_score: f64,
    pub mean_score: f64,
    pub max_score: f64,
    /// Population standard deviation of the scores.
    pub score_std: f64,
}

/// ROC threshold sweep, ascending by threshold.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
}

/// Precision-recall threshold sweep, descending by threshold.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrCurve {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub thresholds: Vec<f64>,
}

/// Supervised metrics; only exists when ground truth was supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
    /// `[[TN, FP], [FN, TP]]`: row is the true class, column the predicted one.
    pub confusion_matrix: [[usize; 2]; 2],
    pub accuracy: f64,
    pub roc_auc: f64,
    pub pr_auc: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub logloss: f64,
    pub roc_curve: RocCurve,
    pub pr_curve: PrCurve,
}

/// Supervised metrics block. Either every field is populated or none is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "PerformanceFields", into = "PerformanceFields")]
pub struct PerformanceMetrics(Option<Performance>);

impl PerformanceMetrics {
    pub fn supervised(performance: Performance) -> Self {
        Self(Some(performance))
    }

    pub fn unsupervised() -> Self {
        Self(None)
    }

    pub fn get(&self) -> Option<&Performance> {
        self.0.as_ref()
    }

    pub fn is_unsupervised(&self) -> bool {
        self.0.is_none()
    }
}

/// Keys of the serialized performance block.
pub(crate) const PERFORMANCE_KEYS: [&str; 10] = [
    "confusion_matrix",
    "accuracy",
    "roc_auc",
    "pr_auc",
    "precision",
    "recall",
    "f1",
    "logloss",
    "roc_curve",
    "pr_curve",
];

#[derive(Default, Serialize, Deserialize)]
struct PerformanceFields {
    confusion_matrix: Option<[[usize; 2]; 2]>,
    accuracy: Option<f64>,
    roc_auc: Option<f64>,
    pr_auc: Option<f64>,
    precision: Option<f64>,
    recall: Option<f64>,
    f1: Option<f64>,
    logloss: Option<f64>,
    roc_curve: Option<[Vec<f64>; 3]>,
    pr_curve: Option<[Vec<f64>; 3]>,
}

impl From<PerformanceMetrics> for PerformanceFields {
    fn from(m: PerformanceMetrics) -> Self {
        let Some(p) = m.0 else {
            return Self::default();
        };
        Self {
            confusion_matrix: Some(p.confusion_matrix),
            accuracy: Some(p.accuracy),
            roc_auc: Some(p.roc_auc),
            pr_auc: Some(p.pr_auc),
            precision: Some(p.precision),
            recall: Some(p.recall),
            f1: Some(p.f1),
            logloss: Some(p.logloss),
            roc_curve: Some([p.roc_curve.fpr, p.roc_curve.tpr, p.roc_curve.thresholds]),
            pr_curve: Some([
                p.pr_curve.precision,
                p.pr_curve.recall,
                p.pr_curve.thresholds,
            ]),
        }
    }
}

impl TryFrom<PerformanceFields> for PerformanceMetrics {
    type Error = String;

    fn try_from(f: PerformanceFields) -> Result<Self, Self::Error> {
        match f {
            PerformanceFields {
                confusion_matrix: Some(confusion_matrix),
                accuracy: Some(accuracy),
                roc_auc: Some(roc_auc),
                pr_auc: Some(pr_auc),
                precision: Some(precision),
                recall: Some(recall),
                f1: Some(f1),
                logloss: Some(logloss),
                roc_curve: Some([fpr, tpr, roc_thresholds]),
                pr_curve: Some([pr_precision, pr_recall, pr_thresholds]),
            } => Ok(Self::supervised(Performance {
                confusion_matrix,
                accuracy,
                roc_auc,
                pr_auc,
                precision,
                recall,
                f1,
                logloss,
                roc_curve: RocCurve {
                    fpr,
                    tpr,
                    thresholds: roc_thresholds,
                },
                pr_curve: PrCurve {
                    precision: pr_precision,
                    recall: pr_recall,
                    thresholds: pr_thresholds,
                },
            })),
            PerformanceFields {
                confusion_matrix: None,
                accuracy: None,
                roc_auc: None,
                pr_auc: None,
                precision: None,
                recall: None,
                f1: None,
                logloss: None,
                roc_curve: None,
                pr_curve: None,
            } => Ok(Self::unsupervised()),
            _ => Err("performance metrics are partially populated".to_string()),
        }
    }
}

/// Full metrics for one evaluated batch. Persisted as artifact metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub input: InputMetrics,
    pub prediction: PredictionMetrics,
    pub performance: PerformanceMetrics,
}

/// Output of an inference run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub metrics: Metrics,
    /// Binarized predictions, one per input row.
    pub predictions: Vec<u8>,
    /// Positive-class scores, aligned with `predictions`.
    pub scores: Vec<f64>,
}

/// Supervised metrics of one stored artifact, as read back from its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceHistory {
    /// The artifact's `model_id`.
    pub index: u64,
    pub roc_auc: f64,
    pub pr_auc: f64,
    pub f1: f64,
    pub log_loss: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unsupervised_metrics() -> Metrics {
        Metrics {
            input: InputMetrics {
                batch_size: 2,
                ground_truth: None,
            },
            prediction: PredictionMetrics {
                positive_rate: 0.5,
                positive_count: 1,
                negative_count: 1,
                min_score: 0.1,
                mean_score: 0.5,
                max_score: 0.9,
                score_std: 0.4,
            },
            performance: PerformanceMetrics::unsupervised(),
        }
    }

    #[test]
    fn test_unsupervised_blocks_serialize_as_nulls() {
        let json = serde_json::to_value(unsupervised_metrics()).unwrap();
        assert_eq!(json["input"]["batch_size"], 2);
        assert!(json["input"]["positive_count"].is_null());
        assert!(json["input"]["positive_rate"].is_null());

        let performance = json["performance"].as_object().unwrap();
        let keys: Vec<&str> = performance.keys().map(String::as_str).collect();
        let mut expected = PERFORMANCE_KEYS.to_vec();
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert!(performance.values().all(|v| v.is_null()));
    }

    #[test]
    fn test_partial_performance_is_rejected() {
        let mut json = serde_json::to_value(unsupervised_metrics()).unwrap();
        json["performance"]["accuracy"] = serde_json::json!(0.5);
        let err = serde_json::from_value::<Metrics>(json).unwrap_err();
        assert!(err.to_string().contains("partially populated"));
    }

    #[test]
    fn test_partial_input_is_rejected() {
        let mut json = serde_json::to_value(unsupervised_metrics()).unwrap();
        json["input"]["positive_count"] = serde_json::json!(1);
        assert!(serde_json::from_value::<Metrics>(json).is_err());
    }

    #[test]
    fn test_curves_serialize_as_three_sequences() {
        let performance = PerformanceMetrics::supervised(Performance {
            confusion_matrix: [[1, 0], [0, 1]],
            accuracy: 1.0,
            roc_auc: 1.0,
            pr_auc: 1.0,
            precision: 1.0,
            recall: 1.0,
            f1: 1.0,
            logloss: 0.1,
            roc_curve: RocCurve {
                fpr: vec![1.0, 0.0, 0.0],
                tpr: vec![1.0, 1.0, 0.0],
                thresholds: vec![0.2, 0.8, 1.8],
            },
            pr_curve: PrCurve {
                precision: vec![1.0, 1.0, 0.5],
                recall: vec![0.0, 1.0, 1.0],
                thresholds: vec![1.8, 0.8, 0.2],
            },
        });
        let json = serde_json::to_value(&performance).unwrap();
        assert_eq!(json["confusion_matrix"], serde_json::json!([[1, 0], [0, 1]]));
        assert_eq!(json["roc_curve"].as_array().unwrap().len(), 3);
        assert_eq!(json["pr_curve"][2], serde_json::json!([1.8, 0.8, 0.2]));

        let back: PerformanceMetrics = serde_json::from_value(json).unwrap();
        assert_eq!(back, performance);
    }
}
