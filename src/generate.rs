//! Generates random loop problems, for trying out the evaluator and for testing it

use crate::problem::{Direction, DistanceEntry, PlatformDescription, ProblemDescription, SlotStatus};

/// Parameters of a random loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorParams {
    /// The number of stations on the loop
    pub n: usize,
    /// Car positions per platform
    pub cars: usize,
    /// The probability that a car position is a candidate site
    pub installable_chance: f64,
    /// The probability that a car position already has an elevator
    pub installed_chance: f64,
    /// The probability that each directional neighbour distance is recorded
    pub distance_chance: f64,
}
impl Default for GeneratorParams {
    fn default() -> Self {
        Self { n: 10, cars: 10, installable_chance: 0.2, installed_chance: 0.1, distance_chance: 0.9 }
    }
}

fn rand_status(rng: &mut fastrand::Rng, params: &GeneratorParams) -> SlotStatus {
    let x = rng.f64();
    if x < params.installed_chance {
        SlotStatus::Installed
    } else if x < params.installed_chance + params.installable_chance {
        SlotStatus::Installable
    } else {
        SlotStatus::Absent
    }
}

/// Generates a loop named `S0`, `S1`, ... with random neighbour distances between 0.5 and 3.5
/// and random platform statuses. The same seed always gives the same problem.
pub fn gen_random_problem(params: &GeneratorParams, seed: u64) -> ProblemDescription {
    let mut rng = fastrand::Rng::with_seed(seed);
    let stations = (0..params.n).map(|i| format!("S{i}")).collect::<Vec<_>>();

    let mut distances = vec![];
    if params.n > 1 {
        for i in 0..params.n {
            for direction in Direction::ALL {
                if rng.f64() >= params.distance_chance {
                    continue;
                }
                let j = match direction {
                    Direction::Inner => (i + 1) % params.n,
                    Direction::Outer => (i + params.n - 1) % params.n,
                };
                let distance = ((0.5 + 3.0 * rng.f64()) * 10.0).round() / 10.0;
                distances.push(DistanceEntry { from: stations[i].clone(), to: stations[j].clone(), distance });
            }
        }
    }

    let platforms = stations
        .iter()
        .map(|station| PlatformDescription {
            station: station.clone(),
            inner: (0..params.cars).map(|_| rand_status(&mut rng, params)).collect(),
            outer: (0..params.cars).map(|_| rand_status(&mut rng, params)).collect(),
        })
        .collect();

    ProblemDescription { stations, distances, platforms }
}
