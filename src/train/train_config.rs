use serde::{Deserialize, Serialize};

use crate::criterion::CriterionType;

/// Hyperparameters for a training run.
///
/// Serde-derived because the full configuration is embedded in every
/// checkpoint, so an interrupted run can be resumed with the exact settings
/// that produced it.
///
/// # Fields
/// - `max_iter`    — last iteration index (inclusive); the loop runs
///                   `[start_iter, max_iter]`
/// - `print_freq`  — emit a progress line every this many iterations
/// - `criterion`   — which masked loss drives the backward pass
/// - `lr_patience` — plateau epochs tolerated before a learning-rate cut
/// - `lr_factor`   — multiplier applied at each cut
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub max_iter: usize,
    pub print_freq: usize,
    pub criterion: CriterionType,
    pub lr_patience: usize,
    pub lr_factor: f64,
}

impl TrainConfig {
    /// A minimal config; scheduler knobs default to the usual
    /// reduce-on-plateau settings (patience 2, halve on cut).
    pub fn new(max_iter: usize, criterion: CriterionType) -> TrainConfig {
        TrainConfig {
            max_iter,
            print_freq: 10,
            criterion,
            lr_patience: 2,
            lr_factor: 0.5,
        }
    }
}
