//! Elevator accessibility: which car positions on each platform have, or could have, an elevator,
//! and the walking distance inside platforms between usable elevators at two stations

use std::{fmt, ops::Range};

use crate::{
    error::{EvaluationError, ProblemError},
    problem::{Direction, PlatformDescription, SlotStatus},
    station_loop::StationLoop,
};

/// One elevator car position at one station in one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElevatorSlot {
    /// Loop position of the station
    pub station: usize,
    pub direction: Direction,
    /// 1-based car position, numbered independently per station and direction
    pub car: usize,
    /// The status as loaded, before any activation
    pub status: SlotStatus,
}
impl ElevatorSlot {
    /// Renders the slot as `station_car_direction`
    pub fn label<'a>(&'a self, station_loop: &'a StationLoop) -> SlotLabel<'a> {
        SlotLabel { slot: self, station_loop }
    }
}

/// Display helper produced by `ElevatorSlot::label`
pub struct SlotLabel<'a> {
    slot: &'a ElevatorSlot,
    station_loop: &'a StationLoop,
}
impl fmt::Display for SlotLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.station_loop.station(self.slot.station).id,
            self.slot.car,
            self.slot.direction
        )
    }
}

/// All elevator slots of the loop, grouped by platform, plus the ordered candidate list
#[derive(Debug, Clone, Default)]
pub struct AccessibilityIndex {
    /// Every slot, grouped by station in loop order, inner before outer, cars ascending
    pub(crate) slots: Vec<ElevatorSlot>,
    /// `platforms[station][direction]` is the range of `slots` on that platform
    pub(crate) platforms: Vec<[Range<usize>; 2]>,
    /// Positions in `slots` of the installable slots, in activation order
    pub(crate) candidates: Vec<usize>,
    /// The number of installable slots, counted separately from `candidates`
    pub(crate) installable: usize,
}
impl AccessibilityIndex {
    /// Scan the platforms of every station in loop order, inner then outer, numbering cars from 1.
    /// Stations without a platform description get empty platforms.
    pub fn new(station_loop: &StationLoop, platforms: &[PlatformDescription]) -> Result<Self, ProblemError> {
        let mut by_station: Vec<Option<&PlatformDescription>> = vec![None; station_loop.len()];
        for platform in platforms {
            let station = station_loop.require(&platform.station, "platform description")?;
            if by_station[station].is_some() {
                log::warn!("station '{}' has more than one platform description, keeping the later one", platform.station);
            }
            by_station[station] = Some(platform);
        }

        let mut index = Self::default();
        for (station, platform) in by_station.into_iter().enumerate() {
            let mut ranges = [0..0, 0..0];
            for (d, direction) in Direction::ALL.into_iter().enumerate() {
                let start = index.slots.len();
                let statuses = platform.map(|p| p.statuses(direction)).unwrap_or_default();
                for (i, &status) in statuses.iter().enumerate() {
                    if status == SlotStatus::Installable {
                        index.candidates.push(index.slots.len());
                        index.installable += 1;
                    }
                    index.slots.push(ElevatorSlot { station, direction, car: i + 1, status });
                }
                ranges[d] = start..index.slots.len();
                if statuses.is_empty() {
                    log::warn!("station '{}' has no {} elevator slots", station_loop.station(station).id, direction);
                }
            }
            index.platforms.push(ranges);
        }
        Ok(index)
    }

    pub fn slots(&self) -> &[ElevatorSlot] {
        &self.slots
    }

    fn platform_range(&self, station: usize, direction: Direction) -> Range<usize> {
        let d = match direction {
            Direction::Inner => 0,
            Direction::Outer => 1,
        };
        self.platforms.get(station).map(|r| r[d].clone()).unwrap_or(0..0)
    }

    /// The installable slots, in the order they will be activated
    pub fn candidates(&self) -> impl Iterator<Item = &ElevatorSlot> + '_ {
        self.candidates.iter().map(|&i| &self.slots[i])
    }

    /// The number of installable slots, which bounds the installation count
    pub fn max_installations(&self) -> usize {
        self.installable
    }

    /// Ensures the candidate list covers exactly the installable slots
    pub fn check_consistency(&self) -> Result<(), EvaluationError> {
        if self.candidates.len() != self.installable {
            return Err(EvaluationError::InconsistentCandidateCount {
                candidates: self.candidates.len(),
                installable: self.installable,
            });
        }
        Ok(())
    }

    /// Usability of every slot when the first `threshold` candidates are installed
    pub fn active_slots(&self, threshold: usize) -> ActiveSlots {
        let mut active = ActiveSlots {
            usable: self.slots.iter().map(|s| s.status == SlotStatus::Installed).collect(),
            activated: 0,
        };
        for _ in 0..threshold {
            active.activate_next(self);
        }
        active
    }
}

/// The usable flag of every slot at one activation threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSlots {
    usable: Vec<bool>,
    activated: usize,
}
impl ActiveSlots {
    /// Install the next candidate in discovery order. Returns `false` once every candidate is installed.
    pub fn activate_next(&mut self, index: &AccessibilityIndex) -> bool {
        match index.candidates.get(self.activated) {
            Some(&slot) => {
                self.usable[slot] = true;
                self.activated += 1;
                true
            }
            None => false,
        }
    }

    /// The number of candidates installed so far
    pub fn activated(&self) -> usize {
        self.activated
    }

    /// Car positions of the usable elevators on one platform
    pub fn usable_cars<'a>(
        &'a self,
        index: &'a AccessibilityIndex,
        station: usize,
        direction: Direction,
    ) -> impl Iterator<Item = usize> + 'a {
        index
            .platform_range(station, direction)
            .filter(move |&i| self.usable[i])
            .map(move |i| index.slots[i].car)
    }
}

/// The walking distance inside platforms when transferring between two stations, measured in cars.
///
/// Only elevators serving the same direction of travel are paired, so differing directions never
/// resolve. Otherwise this is the smallest car offset between a usable elevator at `a` and a usable
/// elevator at `b`, or `None` if either platform has none.
pub fn transfer_distance(
    index: &AccessibilityIndex,
    active: &ActiveSlots,
    a: usize,
    direction_a: Direction,
    b: usize,
    direction_b: Direction,
) -> Option<usize> {
    if direction_a != direction_b {
        return None;
    }
    active
        .usable_cars(index, a, direction_a)
        .flat_map(|car_a| active.usable_cars(index, b, direction_b).map(move |car_b| car_a.abs_diff(car_b)))
        .min()
}
