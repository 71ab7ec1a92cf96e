//! The circular line: stations in loop order, their neighbours in each direction,
//! and the directly recorded distances between them

use std::collections::HashMap;

use itertools::Itertools;
use ndarray::Array2;
use ordered_float::OrderedFloat;

use crate::{
    error::ProblemError,
    problem::{DistanceEntry, Direction},
};

/// A station and its position in loop order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Station {
    pub id: String,
    pub index: usize,
}

/// A direct adjacency on the loop, with its recorded distance if any
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopEdge {
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
    pub distance: Option<f64>,
}

/// The ordered, cyclic sequence of stations
#[derive(Debug, Clone, Default)]
pub struct StationLoop {
    stations: Vec<Station>,
    lookup: HashMap<String, usize>,
}
impl StationLoop {
    /// Build the loop from station identifiers in traversal order
    pub fn new(ids: &[String]) -> Result<Self, ProblemError> {
        let mut lookup = HashMap::with_capacity(ids.len());
        let mut stations = Vec::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            if lookup.insert(id.clone(), index).is_some() {
                return Err(ProblemError::DuplicateStation(id.clone()));
            }
            stations.push(Station { id: id.clone(), index });
        }
        Ok(Self { stations, lookup })
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn station(&self, index: usize) -> &Station {
        &self.stations[index]
    }

    /// Find the loop position of a station identifier
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    /// Like `index_of`, but reports where the unknown station was referenced from
    pub(crate) fn require(&self, id: &str, context: &str) -> Result<usize, ProblemError> {
        self.index_of(id).ok_or_else(|| ProblemError::UnknownStation {
            context: context.to_string(),
            station: id.to_string(),
        })
    }

    /// The adjacent station when travelling one stop in `direction`
    pub fn neighbour(&self, index: usize, direction: Direction) -> usize {
        let n = self.stations.len();
        match direction {
            Direction::Inner => (index + 1) % n,
            Direction::Outer => (index + n - 1) % n,
        }
    }

    /// Every neighbour edge of the loop: for each station, its inner edge then its outer edge.
    /// A single station has no neighbours, so produces no edges.
    pub fn edges(&self, distances: &DirectedDistances) -> Vec<LoopEdge> {
        if self.stations.len() < 2 {
            return vec![];
        }
        (0..self.stations.len())
            .cartesian_product(Direction::ALL)
            .map(|(from, direction)| {
                let to = self.neighbour(from, direction);
                LoopEdge { from, to, direction, distance: distances.get(from, to) }
            })
            .collect()
    }

    /// Every unordered pair of distinct stations, `i < j` in loop order
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> {
        (0..self.stations.len()).tuple_combinations()
    }

    /// The number of unordered station pairs, `n(n-1)/2`
    pub fn pair_count(&self) -> usize {
        let n = self.stations.len();
        n * n.saturating_sub(1) / 2
    }
}

/// Directly recorded distances, indexed `[from, to]` by loop position.
/// Absent entries are unknown, which is distinct from a zero distance.
#[derive(Debug, Clone)]
pub struct DirectedDistances {
    matrix: Array2<Option<f64>>,
}
impl DirectedDistances {
    /// Place each recorded entry in the matrix. Later duplicates override earlier ones.
    pub fn new(station_loop: &StationLoop, entries: &[DistanceEntry]) -> Result<Self, ProblemError> {
        let n = station_loop.len();
        let mut matrix = Array2::from_elem((n, n), None);
        for entry in entries {
            let from = station_loop.require(&entry.from, "distance entry")?;
            let to = station_loop.require(&entry.to, "distance entry")?;
            if !entry.distance.is_finite() || entry.distance < 0.0 {
                return Err(ProblemError::InvalidDistance {
                    from: entry.from.clone(),
                    to: entry.to.clone(),
                    value: entry.distance,
                });
            }
            if matrix[[from, to]].is_some() {
                log::warn!("distance {} -> {} recorded twice, keeping the later value", entry.from, entry.to);
            }
            matrix[[from, to]] = Some(entry.distance);
        }
        Ok(Self { matrix })
    }

    /// The distance recorded in exactly the direction `from -> to`
    pub fn get(&self, from: usize, to: usize) -> Option<f64> {
        self.matrix[[from, to]]
    }

    /// The number of recorded directional entries
    pub fn recorded(&self) -> usize {
        self.matrix.iter().filter(|d| d.is_some()).count()
    }

    /// Resolve the distance between two stations from direct entries only:
    /// the shorter of `a -> b` and `b -> a` if both are recorded, the one that is if only one is,
    /// otherwise unknown. No multi-hop routing is attempted.
    pub fn route_distance(&self, a: usize, b: usize) -> Option<f64> {
        [self.get(a, b), self.get(b, a)]
            .into_iter()
            .flatten()
            .map(OrderedFloat)
            .min()
            .map(|d| d.into_inner())
    }
}
