pub struct L1LogLoss;

// Predictions are clamped here before ln() so the loss stays finite even
// when the model emits a non-positive depth.
const DEPTH_FLOOR: f64 = 1e-3;

impl L1LogLoss {
    /// Mean absolute error in log-depth space over measurable pixels:
    /// mean(|ln p − ln t|), target > 0.
    pub fn loss(predicted: &[f64], target: &[f64]) -> f64 {
        let mut sum = 0.0;
        let mut n = 0usize;
        for (&p, &t) in predicted.iter().zip(target.iter()) {
            if t > 0.0 {
                sum += (p.max(DEPTH_FLOOR).ln() - t.ln()).abs();
                n += 1;
            }
        }
        if n == 0 {
            0.0
        } else {
            sum / n as f64
        }
    }

    /// Per-pixel gradient: sign(ln p − ln t)/(p·n), 0 at invalid pixels.
    pub fn derivative(predicted: &[f64], target: &[f64]) -> Vec<f64> {
        let n = target.iter().filter(|&&t| t > 0.0).count();
        if n == 0 {
            return vec![0.0; predicted.len()];
        }
        let inv_n = 1.0 / n as f64;
        predicted
            .iter()
            .zip(target.iter())
            .map(|(&p, &t)| {
                if t > 0.0 {
                    let p = p.max(DEPTH_FLOOR);
                    (p.ln() - t.ln()).signum() / p * inv_n
                } else {
                    0.0
                }
            })
            .collect()
    }
}
