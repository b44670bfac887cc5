pub mod logger;
pub mod model;

pub use logger::{NullLogger, TrainLogger};
pub use model::{Model, Optimizer};
