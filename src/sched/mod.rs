pub mod plateau;

pub use plateau::ReduceOnPlateau;

use crate::collab::model::Optimizer;

/// Learning-rate schedule policy.
///
/// The trainer calls `advance` exactly once per epoch boundary, after
/// checkpointing, feeding it the latest eval primary metric and the epoch
/// index.  Mutating the optimizer's learning rates is the expected side
/// effect; the policy internals are the implementation's business.
pub trait Scheduler {
    fn advance(&mut self, metric: f64, epoch: usize, optimizer: &mut dyn Optimizer);
}
