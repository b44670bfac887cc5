use serde_json::Value;

/// The model collaborator: forward/backward computation lives outside the
/// loop; the loop only needs these four capabilities.
pub trait Model {
    /// Per-sample predictions for a batch of inputs.
    fn forward(&mut self, inputs: &[Vec<f64>]) -> Vec<Vec<f64>>;

    /// Accumulates gradients of the loss w.r.t. the last forward pass's
    /// predictions (one gradient vector per sample).
    fn backward(&mut self, grads: &[Vec<f64>]);

    /// Toggles training mode.  In eval mode (`false`) the trainer promises
    /// to call only `forward` — no gradients, no parameter mutation.
    fn set_train(&mut self, training: bool);

    /// Serializable parameter snapshot for checkpointing.
    fn state(&self) -> Value;
}

/// The optimizer collaborator.  The parameter-update rule is external; the
/// loop drives `zero_gradients`/`step` and reads the rest for logging and
/// checkpoints.
pub trait Optimizer {
    fn zero_gradients(&mut self);

    fn step(&mut self);

    /// Serializable optimizer state for checkpointing.
    fn state(&self) -> Value;

    /// Current learning rate of each parameter group, read-only.
    fn learning_rates(&self) -> Vec<f64>;

    /// Multiplies every group's learning rate by `factor`.  Called by
    /// schedulers, never by the loop directly.
    fn scale_lr(&mut self, factor: f64);
}
