//! Metrics engine: turns predictions, scores and optional labels into [`Metrics`].

use crate::error::MlError;
use crate::metrics::curves;
use crate::metrics::schema::{
    ClassBalance, InputMetrics, Metrics, Performance, PerformanceMetrics, PredictionMetrics,
};

/// Scores are clamped to `[LOGLOSS_EPSILON, 1 - LOGLOSS_EPSILON]` before taking logs.
pub const LOGLOSS_EPSILON: f64 = 1e-15;

/// Compute input, prediction and (with ground truth) performance metrics.
///
/// `predictions` and `ground_truth` hold 0/1 labels, `scores` the positive-class
/// score for the same rows. The function is pure: equal inputs give bit-identical
/// output.
pub fn compute_metrics(
    predictions: &[u8],
    scores: &[f64],
    ground_truth: Option<&[u8]>,
) -> Result<Metrics, MlError> {
    validate(predictions, scores, ground_truth)?;

    let input = InputMetrics {
        batch_size: predictions.len(),
        ground_truth: ground_truth.map(class_balance),
    };

    let performance = match ground_truth {
        Some(truth) => PerformanceMetrics::supervised(performance(predictions, scores, truth)),
        None => PerformanceMetrics::unsupervised(),
    };

    Ok(Metrics {
        input,
        prediction: prediction_metrics(predictions, scores)?,
        performance,
    })
}

fn validate(predictions: &[u8], scores: &[f64], ground_truth: Option<&[u8]>) -> Result<(), MlError> {
    if predictions.len() != scores.len() {
        return Err(MlError::shape_mismatch(format!(
            "predictions has {} rows, scores has {}",
            predictions.len(),
            scores.len()
        )));
    }
    if let Some(truth) = ground_truth {
        if truth.len() != predictions.len() {
            return Err(MlError::shape_mismatch(format!(
                "predictions has {} rows, ground_truth has {}",
                predictions.len(),
                truth.len()
            )));
        }
    }
    if predictions.is_empty() {
        return Err(MlError::EmptyBatch);
    }

    check_labels("predictions", predictions)?;
    if let Some(truth) = ground_truth {
        check_labels("ground_truth", truth)?;
    }
    if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
        return Err(MlError::invalid_input(format!("non-finite score {bad}")));
    }
    // The threshold sweep needs a finite value above the largest score.
    if scores.contains(&f64::MAX) {
        return Err(MlError::invalid_input("score equals f64::MAX"));
    }
    Ok(())
}

fn check_labels(field: &'static str, labels: &[u8]) -> Result<(), MlError> {
    match labels.iter().find(|&&l| l > 1) {
        Some(&value) => Err(MlError::InvalidLabel { field, value }),
        None => Ok(()),
    }
}

fn class_balance(labels: &[u8]) -> ClassBalance {
    let positive_count = labels.iter().filter(|&&l| l == 1).count();
    ClassBalance {
        positive_count,
        negative_count: labels.len() - positive_count,
        positive_rate: positive_count as f64 / labels.len() as f64,
    }
}

/// Score moments are taken on `scores / max|score|` and scaled back, so large
/// finite scores cannot overflow the sum or the squared deviations.
fn prediction_metrics(predictions: &[u8], scores: &[f64]) -> Result<PredictionMetrics, MlError> {
    let balance = class_balance(predictions);
    let n = scores.len() as f64;
    let scale = scores.iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
    let (mean, std) = if scale == 0.0 {
        (0.0, 0.0)
    } else {
        let mean = scores.iter().map(|s| s / scale).sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s / scale - mean).powi(2)).sum::<f64>() / n;
        (mean * scale, variance.sqrt() * scale)
    };
    if !mean.is_finite() || !std.is_finite() {
        return Err(MlError::invalid_input(
            "score mean or standard deviation is not finite",
        ));
    }

    Ok(PredictionMetrics {
        positive_rate: balance.positive_rate,
        positive_count: balance.positive_count,
        negative_count: balance.negative_count,
        min_score: scores.iter().copied().fold(f64::INFINITY, f64::min),
        mean_score: mean,
        max_score: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        score_std: std,
    })
}

fn performance(predictions: &[u8], scores: &[f64], truth: &[u8]) -> Performance {
    let mut matrix = [[0usize; 2]; 2];
    for (&t, &p) in truth.iter().zip(predictions) {
        matrix[t as usize][p as usize] += 1;
    }
    let [[tn, fp], [fn_, tp]] = matrix;

    let precision = safe_div(tp, tp + fp);
    let recall = safe_div(tp, tp + fn_);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    let (roc_curve, roc_auc) = curves::roc(scores, truth);
    let (pr_curve, pr_auc) = curves::precision_recall(scores, truth);

    Performance {
        confusion_matrix: matrix,
        accuracy: (tn + tp) as f64 / truth.len() as f64,
        roc_auc,
        pr_auc,
        precision,
        recall,
        f1,
        logloss: log_loss(truth, scores),
        roc_curve,
        pr_curve,
    }
}

fn safe_div(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn log_loss(truth: &[u8], scores: &[f64]) -> f64 {
    let total: f64 = truth
        .iter()
        .zip(scores)
        .map(|(&t, &s)| {
            let p = s.clamp(LOGLOSS_EPSILON, 1.0 - LOGLOSS_EPSILON);
            if t == 1 { -p.ln() } else { -(1.0 - p).ln() }
        })
        .sum();
    total / truth.len() as f64
}
