//! Inference pipeline.

use crate::error::MlError;
use crate::metrics::evaluation::compute_metrics;
use crate::metrics::schema::Prediction;
use crate::model::Classifier;

/// Score `features` with `model` and compute metrics, supervised when
/// `ground_truth` is given.
pub fn predict<M: Classifier + ?Sized>(
    model: &M,
    features: &[Vec<f64>],
    ground_truth: Option<&[u8]>,
) -> Result<Prediction, MlError> {
    let predictions = model.predict(features)?;
    let scores = model.predict_proba(features)?;
    let metrics = compute_metrics(&predictions, &scores, ground_truth)?;
    tracing::debug!(
        batch_size = metrics.input.batch_size,
        supervised = ground_truth.is_some(),
        "Computed prediction"
    );

    Ok(Prediction {
        metrics,
        predictions,
        scores,
    })
}
