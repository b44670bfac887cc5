use serde::{Deserialize, Serialize};

use crate::metrics::Measurement;

/// Per-epoch-boundary summary emitted by the trainer.
///
/// When a progress channel is attached, one `EpochSummary` is sent after
/// every completed evaluation pass.  A dropped receiver is ignored —
/// progress reporting is observability, never control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochSummary {
    /// 1-based epoch index (iterations elapsed / epoch length).
    pub epoch: usize,
    /// Iteration at which this boundary fired.
    pub iteration: usize,
    /// Weighted average over the train phase since the previous boundary.
    pub train: Measurement,
    /// Weighted average over the full eval pass.
    pub eval: Measurement,
    /// Whether this epoch strictly improved the primary metric.
    pub is_best: bool,
    /// Learning rate of each parameter group after scheduling.
    pub learning_rates: Vec<f64>,
}
