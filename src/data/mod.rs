pub mod batch;
pub mod cyclic;
pub mod dataset;

pub use batch::Batch;
pub use cyclic::CyclicLoader;
pub use dataset::{Dataset, InMemoryDataset};
