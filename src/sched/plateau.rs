use tracing::info;

use crate::collab::model::Optimizer;
use crate::sched::Scheduler;

/// Cuts the learning rate when the eval metric stops improving.
///
/// After `patience` consecutive epochs without strict improvement every
/// parameter group's learning rate is multiplied by `factor` and the
/// patience counter restarts.
#[derive(Debug)]
pub struct ReduceOnPlateau {
    patience: usize,
    factor: f64,
    best: f64,
    bad_epochs: usize,
}

impl ReduceOnPlateau {
    pub fn new(patience: usize, factor: f64) -> ReduceOnPlateau {
        assert!(factor > 0.0 && factor < 1.0, "factor must be in (0, 1)");
        ReduceOnPlateau {
            patience,
            factor,
            best: f64::MAX,
            bad_epochs: 0,
        }
    }
}

impl Scheduler for ReduceOnPlateau {
    fn advance(&mut self, metric: f64, epoch: usize, optimizer: &mut dyn Optimizer) {
        if metric < self.best {
            self.best = metric;
            self.bad_epochs = 0;
            return;
        }
        self.bad_epochs += 1;
        if self.bad_epochs > self.patience {
            optimizer.scale_lr(self.factor);
            self.bad_epochs = 0;
            info!(
                epoch,
                factor = self.factor,
                lr = ?optimizer.learning_rates(),
                "plateau: reduced learning rate"
            );
        }
    }
}
