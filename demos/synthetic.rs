// Trains a tiny affine depth predictor on synthetic depth maps.
//
// The "model" here is deliberately trivial — one scale and one bias shared
// across pixels — because the point of the demo is the loop around it:
// cyclic training batches, full eval passes, best tracking, and the
// checkpoints that land in ./runs/synthetic.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;

use rand::prelude::*;
use serde_json::{json, Value};

use depth_trainer::{
    Batch, CriterionType, InMemoryDataset, Model, Optimizer, TrainConfig, Trainer,
};

/// Parameters shared between the model and its optimizer, the way a real
/// accelerator framework would share device buffers.
struct Params {
    scale: f64,
    bias: f64,
    grad_scale: f64,
    grad_bias: f64,
    lr: f64,
}

struct AffineDepthModel {
    params: Rc<RefCell<Params>>,
    last_inputs: Vec<Vec<f64>>,
    training: bool,
}

impl Model for AffineDepthModel {
    fn forward(&mut self, inputs: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let p = self.params.borrow();
        let preds = inputs
            .iter()
            .map(|row| row.iter().map(|&x| p.scale * x + p.bias).collect())
            .collect();
        if self.training {
            self.last_inputs = inputs.to_vec();
        }
        preds
    }

    fn backward(&mut self, grads: &[Vec<f64>]) {
        let mut p = self.params.borrow_mut();
        let n = grads.len().max(1) as f64;
        for (grad_row, input_row) in grads.iter().zip(self.last_inputs.iter()) {
            for (&g, &x) in grad_row.iter().zip(input_row.iter()) {
                p.grad_scale += g * x / n;
                p.grad_bias += g / n;
            }
        }
    }

    fn set_train(&mut self, training: bool) {
        self.training = training;
    }

    fn state(&self) -> Value {
        let p = self.params.borrow();
        json!({ "scale": p.scale, "bias": p.bias })
    }
}

struct SgdOptimizer {
    params: Rc<RefCell<Params>>,
}

impl Optimizer for SgdOptimizer {
    fn zero_gradients(&mut self) {
        let mut p = self.params.borrow_mut();
        p.grad_scale = 0.0;
        p.grad_bias = 0.0;
    }

    fn step(&mut self) {
        let mut p = self.params.borrow_mut();
        let lr = p.lr;
        let (gs, gb) = (p.grad_scale, p.grad_bias);
        p.scale -= lr * gs;
        p.bias -= lr * gb;
    }

    fn state(&self) -> Value {
        json!({ "lr": self.params.borrow().lr })
    }

    fn learning_rates(&self) -> Vec<f64> {
        vec![self.params.borrow().lr]
    }

    fn scale_lr(&mut self, factor: f64) {
        self.params.borrow_mut().lr *= factor;
    }
}

/// Synthetic scene: true depth in [1, 10] m, the input is depth / 5 plus
/// noise, and ~10% of ground-truth pixels are dropped to zero (unmeasured).
fn synthetic_dataset(rng: &mut StdRng, batches: usize, samples: usize, pixels: usize) -> InMemoryDataset {
    let mut dataset = InMemoryDataset::default();
    for _ in 0..batches {
        let mut inputs = Vec::with_capacity(samples);
        let mut targets = Vec::with_capacity(samples);
        for _ in 0..samples {
            let mut input = Vec::with_capacity(pixels);
            let mut target = Vec::with_capacity(pixels);
            for _ in 0..pixels {
                let depth = rng.gen_range(1.0..10.0);
                input.push(depth / 5.0 + rng.gen_range(-0.01..0.01));
                target.push(if rng.gen_bool(0.1) { 0.0 } else { depth });
            }
            inputs.push(input);
            targets.push(target);
        }
        dataset.push(Batch::new(inputs, targets));
    }
    dataset
}

fn main() -> Result<(), depth_trainer::TrainError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut rng = StdRng::seed_from_u64(7);
    let train_set = synthetic_dataset(&mut rng, 16, 4, 64);
    let eval_set = synthetic_dataset(&mut rng, 10, 4, 64);

    let params = Rc::new(RefCell::new(Params {
        scale: 1.0,
        bias: 0.0,
        grad_scale: 0.0,
        grad_bias: 0.0,
        lr: 0.5,
    }));
    let model = AffineDepthModel {
        params: Rc::clone(&params),
        last_inputs: Vec::new(),
        training: true,
    };
    let optimizer = SgdOptimizer {
        params: Rc::clone(&params),
    };

    // 16 batches per epoch × 5 epochs.
    let config = TrainConfig::new(80, CriterionType::L1);
    let (tx, rx) = mpsc::channel();

    let mut trainer = Trainer::new(
        model,
        Box::new(optimizer),
        train_set,
        eval_set,
        config,
        "runs/synthetic",
    )?
    .with_progress(tx);

    let best = trainer.run()?;

    for summary in rx.try_iter() {
        println!(
            "epoch {:>2}  train SILog {:>7.2}  eval SILog {:>7.2}  best={}",
            summary.epoch, summary.train.silog, summary.eval.silog, summary.is_best
        );
    }
    let p = params.borrow();
    println!(
        "learned scale={:.3} bias={:.3} (true scale 5.0); best eval SILog {:.2}",
        p.scale, p.bias, best.silog
    );
    Ok(())
}
