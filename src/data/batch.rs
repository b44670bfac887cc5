/// One batch of (input, target) pairs, each sample a flattened map.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub inputs: Vec<Vec<f64>>,
    pub targets: Vec<Vec<f64>>,
}

impl Batch {
    pub fn new(inputs: Vec<Vec<f64>>, targets: Vec<Vec<f64>>) -> Batch {
        assert_eq!(
            inputs.len(),
            targets.len(),
            "inputs and targets must pair up one-to-one"
        );
        Batch { inputs, targets }
    }

    /// Number of samples in the batch — the averaging weight for every
    /// per-sample metric derived from it.
    pub fn size(&self) -> usize {
        self.inputs.len()
    }
}
