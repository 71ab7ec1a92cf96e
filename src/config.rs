//! Run settings for an evaluation, read from an optional TOML file

use serde::{Deserialize, Serialize};

use crate::problem::Direction;

/// How the improvement ratio column is filled
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImprovementRatio {
    /// `(baseline - current) / baseline` over transfer distance per pair,
    /// where the baseline is the run with no new installations
    #[default]
    Relative,
    /// The same constant on every row
    Fixed(f64),
}

/// Settings controlling an evaluation run
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluationConfig {
    /// The directions passed to the transfer distance for every station pair.
    /// Transfers only resolve when both are equal.
    pub transfer_directions: [Direction; 2],
    pub improvement_ratio: ImprovementRatio,
    /// Evaluate installation counts in parallel
    pub parallel: bool,
    /// Name prefix of the timestamped report directory
    pub output_prefix: String,
}
impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            transfer_directions: [Direction::Inner, Direction::Outer],
            improvement_ratio: ImprovementRatio::default(),
            parallel: false,
            output_prefix: String::from("final_results"),
        }
    }
}
