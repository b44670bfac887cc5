use crate::data::batch::Batch;

/// A finite, indexed sequence of batches.
///
/// Evaluation consumes a dataset once per pass, start to finish, in this
/// natural order.  Training wraps one in a [`CyclicLoader`] and never sees
/// the end.
///
/// [`CyclicLoader`]: crate::data::CyclicLoader
pub trait Dataset {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The batch at `index`; `index < len()` is the caller's obligation.
    fn batch(&self, index: usize) -> Batch;
}

/// Dataset backed by owned vectors; the workhorse for demos and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    batches: Vec<Batch>,
}

impl InMemoryDataset {
    pub fn new(batches: Vec<Batch>) -> InMemoryDataset {
        InMemoryDataset { batches }
    }

    pub fn push(&mut self, batch: Batch) {
        self.batches.push(batch);
    }
}

impl Dataset for InMemoryDataset {
    fn len(&self) -> usize {
        self.batches.len()
    }

    fn batch(&self, index: usize) -> Batch {
        self.batches[index].clone()
    }
}
