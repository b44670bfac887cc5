use crate::metrics::measurement::Measurement;

/// Boundary between the loop and the error-metric formulas.
///
/// Implementations must (a) fill every `Measurement` field — no partial
/// results, (b) be deterministic given identical inputs, and (c) keep
/// non-finite values out of the output: unmeasurable pixels are excluded
/// from the denominators, never propagated.  The aggregator does not defend
/// against NaN/inf — that obligation sits here.
pub trait MetricAdapter {
    /// Computes a `Measurement` from per-sample predictions and ground
    /// truths.  `loss` is the criterion value when one was computed this
    /// step (training); `None` during evaluation.
    fn evaluate(&self, preds: &[Vec<f64>], targets: &[Vec<f64>], loss: Option<f64>) -> Measurement;
}

/// Default metric engine for dense depth maps.
///
/// A pixel is measurable iff its ground-truth depth is strictly positive;
/// everything else (sensor dropout, sky) is skipped.  Predictions are
/// clamped to `depth_floor` before the log/reciprocal terms so a degenerate
/// model cannot inject inf into the stream.
#[derive(Debug, Clone)]
pub struct DepthEvaluator {
    /// Smallest depth (in the target's unit) a prediction is clamped to.
    pub depth_floor: f64,
}

impl Default for DepthEvaluator {
    fn default() -> Self {
        DepthEvaluator { depth_floor: 1e-3 }
    }
}

impl MetricAdapter for DepthEvaluator {
    fn evaluate(&self, preds: &[Vec<f64>], targets: &[Vec<f64>], loss: Option<f64>) -> Measurement {
        let mut n = 0usize;
        let mut sum_d = 0.0; // Σ (ln p − ln t)
        let mut sum_d2 = 0.0; // Σ (ln p − ln t)²
        let mut sum_sq_rel = 0.0;
        let mut sum_abs_rel = 0.0;
        let mut sum_inv_sq = 0.0;

        for (pred_row, target_row) in preds.iter().zip(targets.iter()) {
            for (&p, &t) in pred_row.iter().zip(target_row.iter()) {
                if t <= 0.0 {
                    continue;
                }
                let p = p.max(self.depth_floor);
                let d = p.ln() - t.ln();
                sum_d += d;
                sum_d2 += d * d;
                let rel = (p - t) / t;
                sum_abs_rel += rel.abs();
                sum_sq_rel += rel * rel;
                let inv_d = 1.0 / p - 1.0 / t;
                sum_inv_sq += inv_d * inv_d;
                n += 1;
            }
        }

        if n == 0 {
            // Nothing measurable in this batch: report the worst sentinel so
            // the record is visibly a failure, not a silent zero.
            let mut out = Measurement::worst();
            if let Some(l) = loss {
                out.loss = l;
            }
            return out;
        }

        let nf = n as f64;
        let mean_d = sum_d / nf;
        Measurement {
            // Variance of log errors; clamped at zero against rounding.
            silog: (sum_d2 / nf - mean_d * mean_d).max(0.0).sqrt() * 100.0,
            squared_rel: sum_sq_rel / nf * 100.0,
            absrel: sum_abs_rel / nf * 100.0,
            irmse: (sum_inv_sq / nf).sqrt() * 1000.0,
            loss: loss.unwrap_or(0.0),
            data_time: 0.0,
            gpu_time: 0.0,
            valid_count: n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction_scores_zero() {
        let target = vec![vec![1.0, 2.0, 5.0, 10.0]];
        let m = DepthEvaluator::default().evaluate(&target, &target, None);
        assert!(m.silog.abs() < 1e-9);
        assert!(m.squared_rel.abs() < 1e-9);
        assert!(m.absrel.abs() < 1e-9);
        assert!(m.irmse.abs() < 1e-9);
        assert_eq!(m.valid_count, 4);
    }

    #[test]
    fn invalid_pixels_are_excluded_from_denominators() {
        // Zero-depth ground truth must not enter any mean.
        let preds = vec![vec![2.0, 99.0, 4.0]];
        let targets = vec![vec![1.0, 0.0, 2.0]];
        let m = DepthEvaluator::default().evaluate(&preds, &targets, None);
        assert_eq!(m.valid_count, 2);
        // Both valid pixels have pred = 2·gt, so absrel is exactly 100%.
        assert!((m.absrel - 100.0).abs() < 1e-9);
        assert!(m.silog.is_finite());
        assert!(m.irmse.is_finite());
    }

    #[test]
    fn degenerate_predictions_stay_finite() {
        let preds = vec![vec![0.0, -3.0]];
        let targets = vec![vec![1.0, 2.0]];
        let m = DepthEvaluator::default().evaluate(&preds, &targets, Some(0.5));
        assert!(m.silog.is_finite());
        assert!(m.squared_rel.is_finite());
        assert!(m.irmse.is_finite());
        assert_eq!(m.loss, 0.5);
    }

    #[test]
    fn fully_invalid_batch_reports_worst() {
        let preds = vec![vec![1.0, 1.0]];
        let targets = vec![vec![0.0, -1.0]];
        let m = DepthEvaluator::default().evaluate(&preds, &targets, None);
        assert_eq!(m.valid_count, 0);
        assert_eq!(m.silog, f64::MAX);
    }

    #[test]
    fn deterministic_over_repeated_calls() {
        let preds = vec![vec![1.5, 2.5], vec![3.5, 4.5]];
        let targets = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let eval = DepthEvaluator::default();
        assert_eq!(
            eval.evaluate(&preds, &targets, Some(1.0)),
            eval.evaluate(&preds, &targets, Some(1.0))
        );
    }
}
