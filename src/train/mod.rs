pub mod checkpoint;
pub mod epoch_summary;
pub mod train_config;
pub mod trainer;

pub use checkpoint::{Checkpoint, CheckpointPolicy};
pub use epoch_summary::EpochSummary;
pub use train_config::TrainConfig;
pub use trainer::{Trainer, VizHook};
