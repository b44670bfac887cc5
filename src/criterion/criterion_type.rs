use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrainError;

/// Selects which training criterion the loop uses.
///
/// A closed enumeration: the set of supported criteria is validated when the
/// configuration is built, and an unknown tag is a configuration error long
/// before the first training step runs.
///
/// - `L1`    — masked mean absolute error on depths
/// - `L2`    — masked mean squared error on depths
/// - `L1Log` — masked mean absolute error in log-depth space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionType {
    L1,
    L2,
    L1Log,
}

impl FromStr for CriterionType {
    type Err = TrainError;

    fn from_str(s: &str) -> Result<CriterionType, TrainError> {
        match s {
            "l1" => Ok(CriterionType::L1),
            "l2" => Ok(CriterionType::L2),
            "l1_log" => Ok(CriterionType::L1Log),
            other => Err(TrainError::UnknownCriterion(other.to_string())),
        }
    }
}
