pub struct MaskedL2Loss;

impl MaskedL2Loss {
    /// Mean squared error over measurable pixels (target > 0).
    pub fn loss(predicted: &[f64], target: &[f64]) -> f64 {
        let mut sum = 0.0;
        let mut n = 0usize;
        for (&p, &t) in predicted.iter().zip(target.iter()) {
            if t > 0.0 {
                let d = p - t;
                sum += d * d;
                n += 1;
            }
        }
        if n == 0 {
            0.0
        } else {
            sum / n as f64
        }
    }

    /// Per-pixel gradient: 2·(p − t)/n over measurable pixels, 0 elsewhere.
    pub fn derivative(predicted: &[f64], target: &[f64]) -> Vec<f64> {
        let n = target.iter().filter(|&&t| t > 0.0).count();
        if n == 0 {
            return vec![0.0; predicted.len()];
        }
        let scale = 2.0 / n as f64;
        predicted
            .iter()
            .zip(target.iter())
            .map(|(&p, &t)| if t > 0.0 { (p - t) * scale } else { 0.0 })
            .collect()
    }
}
