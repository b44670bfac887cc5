use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;

use serde_json::{json, Value};

use depth_trainer::{
    Batch, Checkpoint, CriterionType, InMemoryDataset, Model, Optimizer, Scheduler, TrainConfig,
    TrainLogger, Trainer,
};

// ---------------------------------------------------------------------------
// Trait doubles
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SharedState {
    /// Additive error on every prediction; shrinks (or grows) per step.
    offset: f64,
    train_forwards: usize,
    eval_forwards: usize,
    steps: usize,
    zero_grads: usize,
    lr: f64,
}

type Shared = Rc<RefCell<SharedState>>;

fn shared(offset: f64) -> Shared {
    Rc::new(RefCell::new(SharedState {
        offset,
        train_forwards: 0,
        eval_forwards: 0,
        steps: 0,
        zero_grads: 0,
        lr: 0.1,
    }))
}

/// Predicts `input + offset`.  Since inputs equal targets in the test
/// datasets, the offset is the entire prediction error.
struct OffsetModel {
    state: Shared,
    training: bool,
}

impl Model for OffsetModel {
    fn forward(&mut self, inputs: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let mut s = self.state.borrow_mut();
        if self.training {
            s.train_forwards += 1;
        } else {
            s.eval_forwards += 1;
        }
        let offset = s.offset;
        inputs
            .iter()
            .map(|row| row.iter().map(|&x| x + offset).collect())
            .collect()
    }

    fn backward(&mut self, _grads: &[Vec<f64>]) {}

    fn set_train(&mut self, training: bool) {
        self.training = training;
    }

    fn state(&self) -> Value {
        json!({ "offset": self.state.borrow().offset })
    }
}

/// Each `step` multiplies the model's offset by `factor`: < 1 improves the
/// model every iteration, > 1 degrades it.
struct FactorOptimizer {
    state: Shared,
    factor: f64,
}

impl Optimizer for FactorOptimizer {
    fn zero_gradients(&mut self) {
        self.state.borrow_mut().zero_grads += 1;
    }

    fn step(&mut self) {
        let mut s = self.state.borrow_mut();
        s.steps += 1;
        s.offset *= self.factor;
    }

    fn state(&self) -> Value {
        json!({ "lr": self.state.borrow().lr })
    }

    fn learning_rates(&self) -> Vec<f64> {
        vec![self.state.borrow().lr]
    }

    fn scale_lr(&mut self, factor: f64) {
        self.state.borrow_mut().lr *= factor;
    }
}

struct RecordingScheduler {
    calls: Rc<RefCell<Vec<(f64, usize)>>>,
}

impl Scheduler for RecordingScheduler {
    fn advance(&mut self, metric: f64, epoch: usize, _optimizer: &mut dyn Optimizer) {
        self.calls.borrow_mut().push((metric, epoch));
    }
}

struct RecordingLogger {
    tags: Rc<RefCell<Vec<String>>>,
}

impl TrainLogger for RecordingLogger {
    fn scalar(&mut self, tag: &str, _value: f64, _it: usize) {
        self.tags.borrow_mut().push(tag.to_string());
    }

    fn scalars(&mut self, tag: &str, _series: &[(&str, f64)], _it: usize) {
        self.tags.borrow_mut().push(tag.to_string());
    }
}

/// Batches whose inputs equal their targets; depths vary across pixels so an
/// additive offset produces a nonzero, offset-monotonic SILog.
fn dataset(batches: usize) -> InMemoryDataset {
    let mut data = InMemoryDataset::default();
    for b in 0..batches {
        let depths: Vec<f64> = vec![1.0, 2.0, 4.0, 8.0 + b as f64];
        data.push(Batch::new(
            vec![depths.clone(), depths.clone()],
            vec![depths.clone(), depths],
        ));
    }
    data
}

// ---------------------------------------------------------------------------
// Loop behavior
// ---------------------------------------------------------------------------

#[test]
fn two_epochs_drive_eval_checkpoints_and_scheduler() {
    let dir = tempfile::tempdir().unwrap();
    let state = shared(2.0);
    let sched_calls = Rc::new(RefCell::new(Vec::new()));
    let tags = Rc::new(RefCell::new(Vec::new()));
    let (tx, rx) = mpsc::channel();

    let model = OffsetModel {
        state: Rc::clone(&state),
        training: true,
    };
    let optimizer = FactorOptimizer {
        state: Rc::clone(&state),
        factor: 0.5,
    };

    // Train set of 3 batches, 7 iterations: boundaries at it = 3 and 6 only.
    let mut config = TrainConfig::new(7, CriterionType::L1);
    config.print_freq = 2;
    let mut trainer = Trainer::new(
        model,
        Box::new(optimizer),
        dataset(3),
        dataset(4),
        config,
        dir.path(),
    )
    .unwrap()
    .with_scheduler(Box::new(RecordingScheduler {
        calls: Rc::clone(&sched_calls),
    }))
    .with_logger(Box::new(RecordingLogger {
        tags: Rc::clone(&tags),
    }))
    .with_progress(tx);

    let best = trainer.run().unwrap();

    {
        let s = state.borrow();
        // One training step per iteration, no more, no less.
        assert_eq!(s.train_forwards, 7);
        assert_eq!(s.steps, 7);
        assert_eq!(s.zero_grads, 7);
        // Two full eval passes over 4 batches each: every batch folded once.
        assert_eq!(s.eval_forwards, 8);
    }

    // Scheduler advanced exactly once per boundary, with the eval metric.
    let calls = sched_calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, 1);
    assert_eq!(calls[1].1, 2);
    // The offset shrinks every step, so the second epoch's metric improves.
    assert!(calls[1].0 < calls[0].0);

    // Both epochs improved on the then-best, so both are best.
    let summaries: Vec<_> = rx.try_iter().collect();
    assert_eq!(summaries.len(), 2);
    assert!(summaries.iter().all(|s| s.is_best));
    assert_eq!(summaries[1].eval.silog, best.silog);

    // Latest checkpoint reflects epoch 2 and carries the collaborator states.
    let latest = Checkpoint::load_json(&dir.path().join("checkpoint_latest.json")).unwrap();
    assert_eq!(latest.epoch, 2);
    assert_eq!(latest.best_result.silog, best.silog);
    assert!(latest.model_state.get("offset").is_some());
    assert!(latest.optimizer_state.get("lr").is_some());
    assert!(dir.path().join("checkpoint_1.json").exists());
    assert!(dir.path().join("checkpoint_2.json").exists());
    assert!(dir.path().join("model_best.json").exists());

    // Scalar series were tagged the way the boundary emits them.
    let tags = tags.borrow();
    assert!(tags.iter().any(|t| t == "Train/SILog"));
    assert!(tags.iter().any(|t| t == "Eval/SILog"));
    assert!(tags.iter().any(|t| t == "TrainVal/SILog"));
    assert!(tags.iter().any(|t| t == "Lr/lr_0"));
}

#[test]
fn degrading_model_keeps_first_epoch_as_best() {
    let dir = tempfile::tempdir().unwrap();
    let state = shared(0.5);
    let (tx, rx) = mpsc::channel();

    let model = OffsetModel {
        state: Rc::clone(&state),
        training: true,
    };
    // Offset grows every step: epoch 2 is strictly worse than epoch 1.
    let optimizer = FactorOptimizer {
        state: Rc::clone(&state),
        factor: 1.5,
    };

    let mut trainer = Trainer::new(
        model,
        Box::new(optimizer),
        dataset(3),
        dataset(2),
        TrainConfig::new(6, CriterionType::L2),
        dir.path(),
    )
    .unwrap()
    .with_progress(tx);

    trainer.run().unwrap();

    let summaries: Vec<_> = rx.try_iter().collect();
    assert_eq!(summaries.len(), 2);
    assert!(summaries[0].is_best);
    assert!(!summaries[1].is_best);

    // best.txt still describes epoch 1; latest still advanced to epoch 2.
    let best_txt = std::fs::read_to_string(dir.path().join("best.txt")).unwrap();
    assert!(best_txt.starts_with("epoch=1,"));
    let latest = Checkpoint::load_json(&dir.path().join("checkpoint_latest.json")).unwrap();
    assert_eq!(latest.epoch, 2);
    // The best checkpoint artifact matches epoch 1, not the latest.
    let best_ckpt = Checkpoint::load_json(&dir.path().join("model_best.json")).unwrap();
    assert_eq!(best_ckpt.epoch, 1);
}

#[test]
fn resume_picks_up_after_the_checkpointed_epoch() {
    let dir = tempfile::tempdir().unwrap();
    let state = shared(2.0);

    let model = OffsetModel {
        state: Rc::clone(&state),
        training: true,
    };
    let optimizer = FactorOptimizer {
        state: Rc::clone(&state),
        factor: 0.5,
    };
    let mut trainer = Trainer::new(
        model,
        Box::new(optimizer),
        dataset(3),
        dataset(2),
        TrainConfig::new(6, CriterionType::L1),
        dir.path(),
    )
    .unwrap();
    trainer.run().unwrap();
    let best_after_first_run = trainer.best_result().clone();

    // Interrupted here.  Reload the latest checkpoint and extend the run.
    let mut checkpoint = Checkpoint::load_json(&dir.path().join("checkpoint_latest.json")).unwrap();
    assert_eq!(checkpoint.epoch, 2);
    checkpoint.config.max_iter = 9;

    let state2 = shared(checkpoint.model_state["offset"].as_f64().unwrap());
    let model = OffsetModel {
        state: Rc::clone(&state2),
        training: true,
    };
    let optimizer = FactorOptimizer {
        state: Rc::clone(&state2),
        factor: 0.5,
    };
    let mut resumed = Trainer::resume(
        model,
        Box::new(optimizer),
        dataset(3),
        dataset(2),
        checkpoint,
        dir.path(),
    )
    .unwrap();

    // Restored best is the first run's best, not the worst sentinel.
    assert_eq!(resumed.best_result(), &best_after_first_run);

    resumed.run().unwrap();

    // Only iterations 7..=9 ran: one more epoch, one more checkpoint.
    assert_eq!(state2.borrow().train_forwards, 3);
    assert!(dir.path().join("checkpoint_3.json").exists());
    let latest = Checkpoint::load_json(&dir.path().join("checkpoint_latest.json")).unwrap();
    assert_eq!(latest.epoch, 3);
    // The model kept improving, so the resumed epoch superseded the old best.
    assert!(latest.best_result.silog < best_after_first_run.silog);
}

#[test]
fn visualization_hook_fires_at_the_stride_without_skewing_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let state = shared(1.0);
    let viz_calls = Rc::new(RefCell::new(Vec::new()));
    let viz_handle = Rc::clone(&viz_calls);

    let model = OffsetModel {
        state: Rc::clone(&state),
        training: true,
    };
    let optimizer = FactorOptimizer {
        state: Rc::clone(&state),
        factor: 0.9,
    };

    // Eval set of 20 batches → stride 20 / 9 = 2 → hook at i = 0, 2, ..., 18.
    let mut trainer = Trainer::new(
        model,
        Box::new(optimizer),
        dataset(3),
        dataset(20),
        TrainConfig::new(3, CriterionType::L1),
        dir.path(),
    )
    .unwrap()
    .with_visualizer(Box::new(move |i, _batch, _preds| {
        viz_handle.borrow_mut().push(i);
    }));

    trainer.run().unwrap();

    let calls = viz_calls.borrow();
    assert_eq!(calls.len(), 10);
    assert_eq!(calls[0], 0);
    assert!(calls.iter().all(|i| i % 2 == 0));
    // Every eval batch was still folded exactly once.
    assert_eq!(state.borrow().eval_forwards, 20);
}

// ---------------------------------------------------------------------------
// Eval coverage
// ---------------------------------------------------------------------------

#[test]
fn small_eval_set_disables_the_stride_but_not_aggregation() {
    let dir = tempfile::tempdir().unwrap();
    let state = shared(1.0);
    let viz_calls = Rc::new(RefCell::new(0usize));
    let viz_handle = Rc::clone(&viz_calls);

    let model = OffsetModel {
        state: Rc::clone(&state),
        training: true,
    };
    let optimizer = FactorOptimizer {
        state: Rc::clone(&state),
        factor: 0.9,
    };

    // 4 eval batches → stride 4 / 9 = 0 → hook never fires.
    let mut trainer = Trainer::new(
        model,
        Box::new(optimizer),
        dataset(2),
        dataset(4),
        TrainConfig::new(2, CriterionType::L1),
        dir.path(),
    )
    .unwrap()
    .with_visualizer(Box::new(move |_, _, _| {
        *viz_handle.borrow_mut() += 1;
    }));

    trainer.run().unwrap();

    assert_eq!(*viz_calls.borrow(), 0);
    assert_eq!(state.borrow().eval_forwards, 4);

    // Worst-sentinel invariant end to end: the very first evaluation became
    // the best, poor as it is.
    let eval_silog = trainer.best_result().silog;
    assert!(eval_silog.is_finite());
    assert!(eval_silog < f64::MAX);
}
