use thiserror::Error;

/// Errors surfaced by configuration validation and checkpoint persistence.
///
/// Checkpoint I/O failures are fatal to the epoch that triggered them: the
/// trainer propagates them immediately and the epoch is considered
/// incomplete.  Resuming from the last good checkpoint is the recovery path;
/// nothing is retried automatically.
#[derive(Debug, Error)]
pub enum TrainError {
    /// The configured criterion tag matched no known loss function.
    /// Raised before any training step runs.
    #[error("no criterion named '{0}' (expected one of: l1, l2, l1_log)")]
    UnknownCriterion(String),

    /// A loader was constructed over a dataset with no batches.
    #[error("dataset is empty")]
    EmptyDataset,

    #[error("checkpoint i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
