pub mod collab;
pub mod criterion;
pub mod data;
pub mod error;
pub mod metrics;
pub mod sched;
pub mod train;

// Convenience re-exports
pub use collab::{Model, NullLogger, Optimizer, TrainLogger};
pub use criterion::CriterionType;
pub use data::{Batch, CyclicLoader, Dataset, InMemoryDataset};
pub use error::TrainError;
pub use metrics::{AverageMeter, DepthEvaluator, Measurement, MetricAdapter};
pub use sched::{ReduceOnPlateau, Scheduler};
pub use train::{Checkpoint, CheckpointPolicy, EpochSummary, TrainConfig, Trainer};
