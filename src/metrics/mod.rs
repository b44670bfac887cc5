pub mod engine;
pub mod measurement;
pub mod meter;

pub use engine::{DepthEvaluator, MetricAdapter};
pub use measurement::Measurement;
pub use meter::AverageMeter;
