pub mod criterion_type;
pub mod l1_log;
pub mod masked_l1;
pub mod masked_l2;

pub use criterion_type::CriterionType;
pub use l1_log::L1LogLoss;
pub use masked_l1::MaskedL1Loss;
pub use masked_l2::MaskedL2Loss;

/// Scalar loss for one sample — dispatches on `CriterionType`.
pub fn compute_loss(criterion: CriterionType, predicted: &[f64], target: &[f64]) -> f64 {
    match criterion {
        CriterionType::L1 => MaskedL1Loss::loss(predicted, target),
        CriterionType::L2 => MaskedL2Loss::loss(predicted, target),
        CriterionType::L1Log => L1LogLoss::loss(predicted, target),
    }
}

/// Per-pixel loss gradient for one sample — dispatches on `CriterionType`.
pub fn compute_derivative(criterion: CriterionType, predicted: &[f64], target: &[f64]) -> Vec<f64> {
    match criterion {
        CriterionType::L1 => MaskedL1Loss::derivative(predicted, target),
        CriterionType::L2 => MaskedL2Loss::derivative(predicted, target),
        CriterionType::L1Log => L1LogLoss::derivative(predicted, target),
    }
}
