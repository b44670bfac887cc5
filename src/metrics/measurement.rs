use serde::{Deserialize, Serialize};

/// One evaluation record: the error metrics computed for a single batch
/// (or a weighted average of many, when produced by `AverageMeter`).
///
/// Immutable once produced — a fresh `Measurement` is created per batch and
/// immediately folded into a meter; it is replaced, never mutated.
///
/// Error metrics follow the KITTI depth-prediction conventions:
/// - `silog`       — scale-invariant log error × 100
/// - `squared_rel` — mean of ((pred − gt) / gt)² × 100
/// - `absrel`      — mean of |pred − gt| / gt × 100
/// - `irmse`       — RMSE of inverse depths, in 1/km
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub silog: f64,
    pub squared_rel: f64,
    pub absrel: f64,
    pub irmse: f64,
    pub loss: f64,
    /// Seconds spent fetching the batch.
    pub data_time: f64,
    /// Seconds spent in forward/backward/update (or forward only, in eval).
    pub gpu_time: f64,
    /// Number of pixels that actually entered the metric denominators.
    pub valid_count: usize,
}

impl Measurement {
    /// The "worst" sentinel: every error metric at the maximum representable
    /// value, so that any real evaluation compares as an improvement.
    pub fn worst() -> Measurement {
        Measurement {
            silog: f64::MAX,
            squared_rel: f64::MAX,
            absrel: f64::MAX,
            irmse: f64::MAX,
            loss: f64::MAX,
            data_time: 0.0,
            gpu_time: 0.0,
            valid_count: 0,
        }
    }

    /// The single scalar used to decide "best" checkpoints (lower is better).
    /// All other metrics are reported but not decision-making.
    pub fn primary(&self) -> f64 {
        self.silog
    }

    /// Strict improvement on the primary metric — ties do not improve.
    pub fn improves_on(&self, other: &Measurement) -> bool {
        self.primary() < other.primary()
    }
}
