//! Plain-text rendering of predictions and performance history.

use crate::metrics::monitoring::HistoryReport;
use crate::metrics::schema::{Metrics, Prediction};
use std::fmt::Write;

const HISTOGRAM_BINS: usize = 20;
const BAR_WIDTH: usize = 40;

/// Score statistics plus a histogram of the score distribution.
pub fn score_overview(prediction: &Prediction) -> String {
    let m = &prediction.metrics;
    let mut out = String::from("Prediction score statistics\n");
    let rows = [
        ("Batch size", m.input.batch_size.to_string()),
        ("Positive rate", format!("{:.3}", m.prediction.positive_rate)),
        ("Mean score", format!("{:.3}", m.prediction.mean_score)),
        ("Score std", format!("{:.3}", m.prediction.score_std)),
        ("Min score", format!("{:.3}", m.prediction.min_score)),
        ("Max score", format!("{:.3}", m.prediction.max_score)),
    ];
    for (name, value) in rows {
        let _ = writeln!(out, "  {name:<14} {value:>8}");
    }

    out.push_str("\nPrediction score distribution\n");
    let (min, max) = (m.prediction.min_score, m.prediction.max_score);
    let width = (max - min) / HISTOGRAM_BINS as f64;
    let mut counts = [0usize; HISTOGRAM_BINS];
    for &s in &prediction.scores {
        let bin = if width > 0.0 {
            (((s - min) / width) as usize).min(HISTOGRAM_BINS - 1)
        } else {
            0
        };
        counts[bin] += 1;
    }
    let peak = counts.iter().copied().max().unwrap_or(0).max(1);
    for (i, &count) in counts.iter().enumerate() {
        if width == 0.0 && i > 0 {
            break;
        }
        let lower = min + width * i as f64;
        let bar = "#".repeat(count * BAR_WIDTH / peak);
        let _ = writeln!(out, "  {lower:>6.3} | {bar} {count}");
    }
    out
}

/// Supervised metric cards and the confusion matrix. Empty without ground truth.
pub fn performance_summary(metrics: &Metrics) -> String {
    let Some(perf) = metrics.performance.get() else {
        return String::new();
    };
    let mut out = String::from("Performance metrics summary\n");
    let rows = [
        ("Accuracy", perf.accuracy),
        ("Precision", perf.precision),
        ("Recall", perf.recall),
        ("F1 score", perf.f1),
        ("ROC AUC", perf.roc_auc),
        ("PR AUC", perf.pr_auc),
        ("Log loss", perf.logloss),
    ];
    for (name, value) in rows {
        let _ = writeln!(out, "  {name:<10} {value:>8.3}");
    }

    let [[tn, fp], [fn_, tp]] = perf.confusion_matrix;
    out.push_str("\nConfusion matrix (rows: true, columns: predicted)\n");
    let _ = writeln!(out, "  {:>8} {:>6} {:>6}", "", "0", "1");
    let _ = writeln!(out, "  {:>8} {tn:>6} {fp:>6}", "0");
    let _ = writeln!(out, "  {:>8} {fn_:>6} {tp:>6}", "1");
    out
}

/// Full report for one prediction.
pub fn render_prediction(prediction: &Prediction) -> String {
    let mut out = score_overview(prediction);
    let summary = performance_summary(&prediction.metrics);
    if !summary.is_empty() {
        out.push('\n');
        out.push_str(&summary);
    }
    out
}

/// Table of supervised metrics per stored model, followed by skipped files.
pub fn render_history(report: &HistoryReport) -> String {
    let mut out = String::new();
    if report.records.is_empty() {
        out.push_str("No performance history recorded\n");
    } else {
        let _ = writeln!(
            out,
            "{:>8} {:>8} {:>8} {:>8} {:>8}",
            "model_id", "roc_auc", "pr_auc", "f1", "log_loss"
        );
        for r in &report.records {
            let _ = writeln!(
                out,
                "{:>8} {:>8.3} {:>8.3} {:>8.3} {:>8.3}",
                r.index, r.roc_auc, r.pr_auc, r.f1, r.log_loss
            );
        }
    }
    for w in &report.warnings {
        let _ = writeln!(out, "skipped model_id {}: {}", w.model_id, w.reason);
    }
    out
}
