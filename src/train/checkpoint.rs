use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::TrainError;
use crate::metrics::Measurement;
use crate::train::train_config::TrainConfig;

/// Everything needed to resume an interrupted run at an epoch boundary.
#[derive(Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    pub epoch: usize,
    pub model_state: Value,
    pub optimizer_state: Value,
    pub best_result: Measurement,
    pub config: TrainConfig,
}

impl Checkpoint {
    /// Serializes the checkpoint to a pretty-printed JSON file.
    pub fn save_json(&self, path: &Path) -> Result<(), TrainError> {
        let file = fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a checkpoint previously written by `save_json`.
    pub fn load_json(path: &Path) -> Result<Checkpoint, TrainError> {
        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Best-result decision and persistence trigger, one transition per epoch
/// boundary.
///
/// Two named outputs per epoch: `checkpoint_latest.json` is always rewritten
/// (resuming must work from the latest point, best or not), `model_best.json`
/// only when the primary metric strictly improved.  Ties are not best.
pub struct CheckpointPolicy {
    output_dir: PathBuf,
    best: Measurement,
}

impl CheckpointPolicy {
    /// Fresh policy: best initialized to the worst sentinel, so the very
    /// first real evaluation supersedes it no matter how poor it is.
    pub fn new(output_dir: impl Into<PathBuf>) -> CheckpointPolicy {
        CheckpointPolicy {
            output_dir: output_dir.into(),
            best: Measurement::worst(),
        }
    }

    /// Policy restored from a previous run's best result.
    pub fn resume(output_dir: impl Into<PathBuf>, best: Measurement) -> CheckpointPolicy {
        CheckpointPolicy {
            output_dir: output_dir.into(),
            best,
        }
    }

    pub fn best(&self) -> &Measurement {
        &self.best
    }

    pub fn best_txt_path(&self) -> PathBuf {
        self.output_dir.join("best.txt")
    }

    pub fn checkpoint_path(&self, epoch: usize) -> PathBuf {
        self.output_dir.join(format!("checkpoint_{epoch}.json"))
    }

    pub fn latest_path(&self) -> PathBuf {
        self.output_dir.join("checkpoint_latest.json")
    }

    pub fn best_model_path(&self) -> PathBuf {
        self.output_dir.join("model_best.json")
    }

    /// One epoch-boundary transition.  Returns whether this epoch became the
    /// new best.
    ///
    /// Persistence failure is fatal to the epoch: the error propagates and
    /// nothing is retried — a silent skip would corrupt resumability.
    pub fn on_epoch_end(
        &mut self,
        epoch: usize,
        eval_avg: &Measurement,
        model_state: Value,
        optimizer_state: Value,
        config: &TrainConfig,
    ) -> Result<bool, TrainError> {
        fs::create_dir_all(&self.output_dir)?;

        let is_best = eval_avg.improves_on(&self.best);
        if is_best {
            self.best = eval_avg.clone();
            // Overwritten each time: best.txt always describes exactly one epoch.
            let summary = format!(
                "epoch={}, SILog={:.2}, sqErrorRel={:.2}, absErrorRel={:.2}, iRMSE={:.2}, t_gpu={:.4}",
                epoch,
                eval_avg.silog,
                eval_avg.squared_rel,
                eval_avg.absrel,
                eval_avg.irmse,
                eval_avg.gpu_time,
            );
            fs::write(self.best_txt_path(), summary)?;
        }

        let checkpoint = Checkpoint {
            epoch,
            model_state,
            optimizer_state,
            best_result: self.best.clone(),
            config: config.clone(),
        };
        let epoch_path = self.checkpoint_path(epoch);
        checkpoint.save_json(&epoch_path)?;
        fs::copy(&epoch_path, self.latest_path())?;
        if is_best {
            fs::copy(&epoch_path, self.best_model_path())?;
        }

        info!(epoch, is_best, silog = eval_avg.silog, "checkpoint written");
        Ok(is_best)
    }
}
