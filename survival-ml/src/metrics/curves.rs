//! ROC and precision-recall threshold sweeps.
//!
//! Both curves walk the distinct scores from high to low, treating every score
//! at or above the threshold as a positive prediction. Tied scores form a single
//! point. Each sweep is prefixed with an anchor threshold above `max(score)`
//! (normally `max(score) + 1`) at which nothing is predicted positive.

use crate::metrics::schema::{PrCurve, RocCurve};

/// Cumulative confusion counts at one threshold.
#[derive(Debug, Clone, Copy)]
struct SweepPoint {
    threshold: f64,
    tp: usize,
    fp: usize,
}

/// Descending-threshold sweep including the anchor. `labels` must be 0/1.
fn sweep(scores: &[f64], labels: &[u8]) -> Vec<SweepPoint> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let max_score = order.first().map_or(0.0, |&i| scores[i]);
    let mut points = vec![SweepPoint {
        threshold: anchor(max_score),
        tp: 0,
        fp: 0,
    }];

    let (mut tp, mut fp) = (0, 0);
    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if labels[order[i]] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(SweepPoint { threshold, tp, fp });
    }
    points
}

/// `max_score + 1`, or the next representable value when adding 1 is lost to
/// rounding.
fn anchor(max_score: f64) -> f64 {
    let bumped = max_score + 1.0;
    if bumped > max_score {
        bumped
    } else {
        max_score.next_up()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// ROC curve (ascending by threshold) and its trapezoidal area.
///
/// With a single class in `labels` the area is undefined and reported as 0.5.
pub fn roc(scores: &[f64], labels: &[u8]) -> (RocCurve, f64) {
    let positives = labels.iter().filter(|&&l| l == 1).count();
    let negatives = labels.len() - positives;
    let points = sweep(scores, labels);

    let fpr: Vec<f64> = points.iter().map(|p| ratio(p.fp, negatives)).collect();
    let tpr: Vec<f64> = points.iter().map(|p| ratio(p.tp, positives)).collect();

    let auc = if positives == 0 || negatives == 0 {
        0.5
    } else {
        fpr.windows(2)
            .zip(tpr.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[1] + y[0]) / 2.0)
            .sum::<f64>()
            .clamp(0.0, 1.0)
    };

    let mut curve = RocCurve {
        fpr,
        tpr,
        thresholds: points.iter().map(|p| p.threshold).collect(),
    };
    curve.fpr.reverse();
    curve.tpr.reverse();
    curve.thresholds.reverse();
    (curve, auc)
}

/// Precision-recall curve (descending by threshold) and average precision.
///
/// Average precision is `Σ (R_n − R_{n−1}) · P_n` over the sweep. Without any
/// positive label recall is 0 everywhere and the average precision is 0.
pub fn precision_recall(scores: &[f64], labels: &[u8]) -> (PrCurve, f64) {
    let positives = labels.iter().filter(|&&l| l == 1).count();
    let points = sweep(scores, labels);

    let precision: Vec<f64> = points
        .iter()
        .map(|p| if p.tp + p.fp == 0 { 1.0 } else { ratio(p.tp, p.tp + p.fp) })
        .collect();
    let recall: Vec<f64> = points.iter().map(|p| ratio(p.tp, positives)).collect();

    let average_precision = recall
        .windows(2)
        .zip(&precision[1..])
        .map(|(r, p)| (r[1] - r[0]) * p)
        .sum::<f64>()
        .clamp(0.0, 1.0);

    let curve = PrCurve {
        precision,
        recall,
        thresholds: points.iter().map(|p| p.threshold).collect(),
    };
    (curve, average_precision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roc_perfect_separation() {
        let (curve, auc) = roc(&[0.9, 0.8, 0.3, 0.1], &[1, 1, 0, 0]);
        assert!((auc - 1.0).abs() < 1e-12);
        assert_eq!(&curve.thresholds[..4], &[0.1, 0.3, 0.8, 0.9]);
        assert!(curve.thresholds[4] > 0.9);
        assert_eq!(curve.fpr, vec![1.0, 0.5, 0.0, 0.0, 0.0]);
        assert_eq!(curve.tpr, vec![1.0, 1.0, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_roc_inverted_scores() {
        let (_, auc) = roc(&[0.1, 0.2, 0.8, 0.9], &[1, 1, 0, 0]);
        assert!(auc.abs() < 1e-12);
    }

    #[test]
    fn test_roc_ties_are_one_point() {
        let (curve, auc) = roc(&[0.5, 0.5, 0.5, 0.5], &[1, 0, 1, 0]);
        assert_eq!(curve.thresholds.len(), 2);
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_roc_single_class_is_half() {
        let (curve, auc) = roc(&[0.2, 0.7], &[0, 0]);
        assert_eq!(auc, 0.5);
        assert!(curve.tpr.iter().all(|&t| t == 0.0));
    }

    #[test]
    fn test_pr_curve_order_and_average_precision() {
        // Descending scores: pos, neg, pos, neg.
        let (curve, ap) = precision_recall(&[0.9, 0.7, 0.6, 0.2], &[1, 0, 1, 0]);
        assert!(curve.thresholds[0] > 0.9);
        assert_eq!(&curve.thresholds[1..], &[0.9, 0.7, 0.6, 0.2]);
        assert_eq!(curve.recall, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert_eq!(curve.precision[0], 1.0);
        assert!((curve.precision[3] - 2.0 / 3.0).abs() < 1e-12);
        // 0.5 * 1.0 + 0.5 * 2/3
        assert!((ap - (0.5 + 1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_pr_without_positives() {
        let (curve, ap) = precision_recall(&[0.3, 0.6], &[0, 0]);
        assert_eq!(ap, 0.0);
        assert!(curve.recall.iter().all(|&r| r == 0.0));
    }

    #[test]
    fn test_anchor_above_huge_scores() {
        let (curve, _) = roc(&[1e17, 0.0], &[1, 0]);
        assert!(curve.thresholds.windows(2).all(|w| w[0] < w[1]));
        assert!(curve.thresholds[2] > 1e17);
        assert!(curve.thresholds[2].is_finite());
    }

    #[test]
    fn test_curves_are_parallel() {
        let scores = [0.1, 0.4, 0.35, 0.8, 0.4];
        let labels = [0, 0, 1, 1, 1];
        let (roc_curve, _) = roc(&scores, &labels);
        let (pr_curve, _) = precision_recall(&scores, &labels);
        assert_eq!(roc_curve.fpr.len(), roc_curve.thresholds.len());
        assert_eq!(roc_curve.tpr.len(), roc_curve.thresholds.len());
        assert_eq!(pr_curve.precision.len(), pr_curve.thresholds.len());
        assert_eq!(pr_curve.recall.len(), pr_curve.thresholds.len());
    }
}
