use crate::data::batch::Batch;
use crate::data::dataset::Dataset;
use crate::error::TrainError;

/// Presents a finite dataset as a cyclic, infinite stream of batches.
///
/// The restart point is explicit: after serving the last batch the cursor
/// wraps to index 0.  Exhaustion is not an error condition here — it does
/// not exist.  Ordering across restarts is the dataset's natural order; no
/// sample is privileged.
#[derive(Debug)]
pub struct CyclicLoader<D: Dataset> {
    dataset: D,
    cursor: usize,
}

impl<D: Dataset> CyclicLoader<D> {
    /// Fails with `TrainError::EmptyDataset` — a cyclic stream over nothing
    /// would spin forever serving nothing.
    pub fn new(dataset: D) -> Result<CyclicLoader<D>, TrainError> {
        if dataset.is_empty() {
            return Err(TrainError::EmptyDataset);
        }
        Ok(CyclicLoader { dataset, cursor: 0 })
    }

    /// Serves the next batch, wrapping at the end of the dataset.
    pub fn next_batch(&mut self) -> Batch {
        let batch = self.dataset.batch(self.cursor);
        self.cursor = (self.cursor + 1) % self.dataset.len();
        batch
    }

    /// Batches per full pass over the underlying dataset.  The trainer uses
    /// this as its epoch length (`iter_save`).
    pub fn epoch_len(&self) -> usize {
        self.dataset.len()
    }
}
