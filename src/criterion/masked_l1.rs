pub struct MaskedL1Loss;

impl MaskedL1Loss {
    /// Mean absolute error over measurable pixels (target > 0).
    /// An all-invalid sample contributes zero loss.
    pub fn loss(predicted: &[f64], target: &[f64]) -> f64 {
        let mut sum = 0.0;
        let mut n = 0usize;
        for (&p, &t) in predicted.iter().zip(target.iter()) {
            if t > 0.0 {
                sum += (p - t).abs();
                n += 1;
            }
        }
        if n == 0 {
            0.0
        } else {
            sum / n as f64
        }
    }

    /// Per-pixel gradient: sign(p − t)/n over measurable pixels, 0 elsewhere.
    pub fn derivative(predicted: &[f64], target: &[f64]) -> Vec<f64> {
        let n = target.iter().filter(|&&t| t > 0.0).count();
        if n == 0 {
            return vec![0.0; predicted.len()];
        }
        let inv_n = 1.0 / n as f64;
        predicted
            .iter()
            .zip(target.iter())
            .map(|(&p, &t)| if t > 0.0 { (p - t).signum() * inv_n } else { 0.0 })
            .collect()
    }
}
