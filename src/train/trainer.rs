use std::path::Path;
use std::sync::mpsc;
use std::time::Instant;

use tracing::info;

use crate::collab::{Model, NullLogger, Optimizer, TrainLogger};
use crate::criterion::{compute_derivative, compute_loss};
use crate::data::{Batch, CyclicLoader, Dataset};
use crate::error::TrainError;
use crate::metrics::{AverageMeter, DepthEvaluator, Measurement, MetricAdapter};
use crate::sched::{ReduceOnPlateau, Scheduler};
use crate::train::checkpoint::{Checkpoint, CheckpointPolicy};
use crate::train::epoch_summary::EpochSummary;
use crate::train::train_config::TrainConfig;

/// Visualization hook fired at a fixed stride during evaluation passes.
/// Receives the batch index, the batch, and the model's predictions.
pub type VizHook = Box<dyn FnMut(usize, &Batch, &[Vec<f64>])>;

/// The top-level training driver.
///
/// Owns all mutable training state — the two meters, the best result (inside
/// the checkpoint policy), the cyclic train cursor — so several independent
/// runs can coexist in one process.  Strictly alternates two mutually
/// exclusive phases: every iteration runs exactly one training step, and
/// every `iter_save`-th iteration additionally runs one full evaluation pass
/// before training resumes.
pub struct Trainer<M: Model, D: Dataset> {
    model: M,
    optimizer: Box<dyn Optimizer>,
    scheduler: Box<dyn Scheduler>,
    evaluator: Box<dyn MetricAdapter>,
    train_loader: CyclicLoader<D>,
    eval_set: D,
    train_meter: AverageMeter,
    eval_meter: AverageMeter,
    policy: CheckpointPolicy,
    logger: Box<dyn TrainLogger>,
    progress_tx: Option<mpsc::Sender<EpochSummary>>,
    viz: Option<VizHook>,
    config: TrainConfig,
    start_iter: usize,
    /// Iterations per full pass over the training set; checkpoint cadence.
    iter_save: usize,
    /// Latest eval primary metric; feeds the scheduler.
    metric: f64,
}

impl<M: Model, D: Dataset> Trainer<M, D> {
    /// Builds a fresh trainer starting at iteration 1 with the best result
    /// at the worst sentinel.
    pub fn new(
        model: M,
        optimizer: Box<dyn Optimizer>,
        train_set: D,
        eval_set: D,
        config: TrainConfig,
        output_dir: impl AsRef<Path>,
    ) -> Result<Trainer<M, D>, TrainError> {
        if eval_set.is_empty() {
            return Err(TrainError::EmptyDataset);
        }
        let train_loader = CyclicLoader::new(train_set)?;
        let iter_save = train_loader.epoch_len();
        let scheduler = Box::new(ReduceOnPlateau::new(config.lr_patience, config.lr_factor));
        let best = Measurement::worst();
        let metric = best.primary();

        Ok(Trainer {
            model,
            optimizer,
            scheduler,
            evaluator: Box::new(DepthEvaluator::default()),
            train_loader,
            eval_set,
            train_meter: AverageMeter::new(),
            eval_meter: AverageMeter::new(),
            policy: CheckpointPolicy::new(output_dir.as_ref()),
            logger: Box::new(NullLogger),
            progress_tx: None,
            viz: None,
            config,
            start_iter: 1,
            iter_save,
            metric,
        })
    }

    /// Builds a trainer resuming from a loaded checkpoint: iteration picks
    /// up right after the checkpointed epoch boundary and the best result is
    /// restored.  Model and optimizer must already carry the checkpoint's
    /// states — applying snapshots is the collaborators' business.
    pub fn resume(
        model: M,
        optimizer: Box<dyn Optimizer>,
        train_set: D,
        eval_set: D,
        checkpoint: Checkpoint,
        output_dir: impl AsRef<Path>,
    ) -> Result<Trainer<M, D>, TrainError> {
        let mut trainer = Trainer::new(
            model,
            optimizer,
            train_set,
            eval_set,
            checkpoint.config,
            output_dir.as_ref(),
        )?;
        trainer.start_iter = checkpoint.epoch * trainer.iter_save + 1;
        trainer.metric = checkpoint.best_result.primary();
        trainer.policy = CheckpointPolicy::resume(output_dir.as_ref(), checkpoint.best_result);
        Ok(trainer)
    }

    /// Swaps in a different metric adapter.
    pub fn with_evaluator(mut self, evaluator: Box<dyn MetricAdapter>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Swaps in a different learning-rate schedule.
    pub fn with_scheduler(mut self, scheduler: Box<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Attaches a scalar-series sink.
    pub fn with_logger(mut self, logger: Box<dyn TrainLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Attaches a progress channel; one `EpochSummary` is sent per boundary.
    /// A dropped receiver never aborts the run.
    pub fn with_progress(mut self, tx: mpsc::Sender<EpochSummary>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Attaches the evaluation-time visualization hook.
    pub fn with_visualizer(mut self, viz: VizHook) -> Self {
        self.viz = Some(viz);
        self
    }

    pub fn best_result(&self) -> &Measurement {
        self.policy.best()
    }

    // ───────────────────────────────────────────────────────────────────────
    // Main loop
    // ───────────────────────────────────────────────────────────────────────

    /// Runs iterations `[start_iter, max_iter]` inclusive, evaluating and
    /// checkpointing at every epoch boundary.  Returns the final best
    /// evaluation result.
    ///
    /// The only fatal errors are persistence failures; the epoch that hit
    /// one is considered incomplete (resume from the previous checkpoint).
    pub fn run(&mut self) -> Result<Measurement, TrainError> {
        for it in self.start_iter..=self.config.max_iter {
            self.model.set_train(true);
            self.train_iter(it);

            if it % self.iter_save == 0 {
                self.model.set_train(false);
                self.eval(it);
                self.epoch_boundary(it)?;
            }
        }
        Ok(self.policy.best().clone())
    }

    /// One training step: cyclic fetch → forward → loss/gradient →
    /// backward → optimizer step → fold into the train meter.
    fn train_iter(&mut self, it: usize) {
        self.optimizer.zero_gradients();

        let fetch_start = Instant::now();
        let batch = self.train_loader.next_batch();
        let data_time = fetch_start.elapsed().as_secs_f64();

        let step_start = Instant::now();
        let preds = self.model.forward(&batch.inputs);

        let mut loss_sum = 0.0;
        let grads: Vec<Vec<f64>> = preds
            .iter()
            .zip(batch.targets.iter())
            .map(|(pred, target)| {
                loss_sum += compute_loss(self.config.criterion, pred, target);
                compute_derivative(self.config.criterion, pred, target)
            })
            .collect();
        let loss = loss_sum / batch.size() as f64;

        self.model.backward(&grads);
        self.optimizer.step();
        let gpu_time = step_start.elapsed().as_secs_f64();

        let result = self
            .evaluator
            .evaluate(&preds, &batch.targets, Some(loss));
        self.train_meter
            .update(&result, gpu_time, data_time, batch.size());

        if it % self.config.print_freq == 0 {
            let avg = self.train_meter.average();
            info!(
                it,
                max_iter = self.config.max_iter,
                loss,
                silog = result.silog,
                avg_silog = avg.silog,
                avg_absrel = avg.absrel,
                data_time,
                gpu_time,
                "train"
            );
            self.logger.scalar("Train/Loss", avg.loss, it);
            self.logger.scalar("Train/SILog", avg.silog, it);
            self.logger.scalar("Train/sqErrorRel", avg.squared_rel, it);
            self.logger.scalar("Train/absErrorRel", avg.absrel, it);
            self.logger.scalar("Train/iRMSE", avg.irmse, it);
        }
    }

    /// One full pass over the evaluation set: forward only, every batch
    /// folded into the eval meter exactly once.
    fn eval(&mut self, it: usize) {
        let len = self.eval_set.len();
        // ~9 evenly spaced visualization triggers over the whole pass.  The
        // stride never gates metric aggregation.
        let skip = len / 9;

        self.eval_meter.reset();

        for i in 0..len {
            let fetch_start = Instant::now();
            let batch = self.eval_set.batch(i);
            let data_time = fetch_start.elapsed().as_secs_f64();

            let step_start = Instant::now();
            let preds = self.model.forward(&batch.inputs);
            let gpu_time = step_start.elapsed().as_secs_f64();

            let result = self.evaluator.evaluate(&preds, &batch.targets, None);
            self.eval_meter
                .update(&result, gpu_time, data_time, batch.size());

            if skip > 0 && i % skip == 0 {
                if let Some(viz) = self.viz.as_mut() {
                    viz(i, &batch, &preds);
                }
            }

            if (i + 1) % self.config.print_freq == 0 {
                let avg = self.eval_meter.average();
                info!(
                    batch = i + 1,
                    total = len,
                    silog = result.silog,
                    avg_silog = avg.silog,
                    avg_irmse = avg.irmse,
                    gpu_time,
                    "eval"
                );
            }
        }

        let avg = self.eval_meter.average();
        info!(
            it,
            silog = avg.silog,
            squared_rel = avg.squared_rel,
            absrel = avg.absrel,
            irmse = avg.irmse,
            gpu_time = avg.gpu_time,
            "eval pass complete"
        );
        self.logger.scalar("Eval/SILog", avg.silog, it);
        self.logger.scalar("Eval/sqErrorRel", avg.squared_rel, it);
        self.logger.scalar("Eval/absErrorRel", avg.absrel, it);
        self.logger.scalar("Eval/iRMSE", avg.irmse, it);
    }

    /// Everything that happens once per epoch boundary, in order: combined
    /// scalar emission, checkpoint decision, train-meter reset, then —
    /// exactly once, after checkpointing — the scheduler advance.
    fn epoch_boundary(&mut self, it: usize) -> Result<(), TrainError> {
        let epoch = it / self.iter_save;
        let train_avg = self.train_meter.average();
        let eval_avg = self.eval_meter.average();
        self.metric = eval_avg.primary();

        self.logger.scalars(
            "TrainVal/SILog",
            &[("train", train_avg.silog), ("eval", eval_avg.silog)],
            it,
        );
        self.logger.scalars(
            "TrainVal/sqErrorRel",
            &[
                ("train", train_avg.squared_rel),
                ("eval", eval_avg.squared_rel),
            ],
            it,
        );
        self.logger.scalars(
            "TrainVal/absErrorRel",
            &[("train", train_avg.absrel), ("eval", eval_avg.absrel)],
            it,
        );
        self.logger.scalars(
            "TrainVal/iRMSE",
            &[("train", train_avg.irmse), ("eval", eval_avg.irmse)],
            it,
        );
        for (i, lr) in self.optimizer.learning_rates().iter().enumerate() {
            self.logger.scalar(&format!("Lr/lr_{i}"), *lr, it);
        }

        let is_best = self.policy.on_epoch_end(
            epoch,
            &eval_avg,
            self.model.state(),
            self.optimizer.state(),
            &self.config,
        )?;
        self.train_meter.reset();

        self.scheduler
            .advance(self.metric, epoch, self.optimizer.as_mut());

        if let Some(tx) = &self.progress_tx {
            // Ignore a dropped receiver: reporting never aborts training.
            let _ = tx.send(EpochSummary {
                epoch,
                iteration: it,
                train: train_avg,
                eval: eval_avg,
                is_best,
                learning_rates: self.optimizer.learning_rates(),
            });
        }
        Ok(())
    }
}
