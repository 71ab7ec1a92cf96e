//! Evaluates the effect of installing elevators one candidate at a time
//!
//! For every installation count from zero up to the number of installable slots, the leading
//! candidates (in discovery order) are treated as installed, and distances are aggregated over
//! every unordered pair of stations on the loop.

use itertools::Itertools;
use rayon::prelude::*;

use crate::{
    accessibility::{transfer_distance, ActiveSlots},
    config::{EvaluationConfig, ImprovementRatio},
    error::EvaluationError,
    problem::Problem,
};

/// The aggregate metrics for one installation count
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub installed_count: usize,
    /// Labels of the installed candidates, in activation order
    pub installed_slots: Vec<String>,
    pub total_station_distance: f64,
    pub total_transfer_distance: f64,
    /// Always `n(n-1)/2`, whether or not the pair's distances are known
    pub evaluated_pairs: usize,
    pub transfer_distance_per_pair: f64,
    pub improvement_ratio: f64,
}

/// Sums accumulated over the station pairs at one activation threshold
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PairTotals {
    pub station_distance: f64,
    pub transfer_distance: f64,
    pub pairs: usize,
}
impl PairTotals {
    /// Transfer distance averaged over every evaluated pair, known or not
    pub fn transfer_distance_per_pair(&self) -> f64 {
        if self.pairs == 0 {
            0.0
        } else {
            self.transfer_distance / self.pairs as f64
        }
    }
}

/// Sum route and transfer distances over every pair of stations, skipping unknown values
/// but counting every pair
pub fn pair_totals(problem: &Problem, active: &ActiveSlots, config: &EvaluationConfig) -> PairTotals {
    let [direction_a, direction_b] = config.transfer_directions;
    let mut totals = PairTotals::default();
    for (a, b) in problem.station_loop.pairs() {
        if let Some(d) = problem.distances.route_distance(a, b) {
            totals.station_distance += d;
        }
        if let Some(t) = transfer_distance(&problem.accessibility, active, a, direction_a, b, direction_b) {
            totals.transfer_distance += t as f64;
        }
        totals.pairs += 1;
    }
    totals
}

/// Steps through installation counts for one problem
pub struct InstallationEvaluator<'a> {
    problem: &'a Problem,
    config: &'a EvaluationConfig,
}
impl<'a> InstallationEvaluator<'a> {
    pub fn new(problem: &'a Problem, config: &'a EvaluationConfig) -> Self {
        Self { problem, config }
    }

    /// The largest installation count that will be evaluated
    pub fn max_installations(&self) -> usize {
        self.problem.accessibility.max_installations()
    }

    /// Evaluate every installation count from 0 to the number of installable slots, inclusive
    pub fn run(&self) -> Result<Vec<EvaluationResult>, EvaluationError> {
        let index = &self.problem.accessibility;
        index.check_consistency()?;
        let max = self.max_installations();
        log::info!("evaluating installation counts 0..={max} over {} station pairs", self.problem.station_loop.pair_count());

        let totals = if self.config.parallel {
            (0..=max)
                .into_par_iter()
                .map(|count| self.totals_at(&index.active_slots(count)))
                .collect::<Vec<_>>()
        } else {
            let mut active = index.active_slots(0);
            let mut totals = Vec::with_capacity(max + 1);
            for count in 0..=max {
                if count > 0 {
                    active.activate_next(index);
                }
                totals.push(self.totals_at(&active));
            }
            totals
        };

        let labels = index.candidates().map(|slot| slot.label(&self.problem.station_loop).to_string()).collect_vec();
        let baseline = totals.first().map(PairTotals::transfer_distance_per_pair).unwrap_or_default();
        Ok(totals
            .into_iter()
            .enumerate()
            .map(|(count, totals)| {
                let per_pair = totals.transfer_distance_per_pair();
                EvaluationResult {
                    installed_count: count,
                    installed_slots: labels[..count].to_vec(),
                    total_station_distance: totals.station_distance,
                    total_transfer_distance: totals.transfer_distance,
                    evaluated_pairs: totals.pairs,
                    transfer_distance_per_pair: per_pair,
                    improvement_ratio: improvement(self.config.improvement_ratio, baseline, per_pair),
                }
            })
            .collect())
    }

    fn totals_at(&self, active: &ActiveSlots) -> PairTotals {
        let totals = pair_totals(self.problem, active, self.config);
        log::debug!(
            "{} installed: station distance {}, transfer distance {} over {} pairs",
            active.activated(),
            totals.station_distance,
            totals.transfer_distance,
            totals.pairs
        );
        totals
    }
}

/// Fill the improvement ratio column for one row
pub fn improvement(mode: ImprovementRatio, baseline: f64, current: f64) -> f64 {
    match mode {
        ImprovementRatio::Fixed(value) => value,
        ImprovementRatio::Relative if baseline == 0.0 => 0.0,
        ImprovementRatio::Relative => (baseline - current) / baseline,
    }
}
