//! This module contains the interfaces for the evaluator: the `ProblemDescription` struct, which is the
//! raw content of a problem file, and the `Problem` struct, which validates it and caches the
//! station loop, the directed distances and the elevator accessibility index built from it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    accessibility::AccessibilityIndex,
    error::ProblemError,
    station_loop::{DirectedDistances, StationLoop},
};

/// The two traversal directions around the loop
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Clockwise, towards the next station in loop order
    Inner,
    /// Counter-clockwise, towards the previous station in loop order
    Outer,
}
impl Direction {
    /// Both directions, in scanning order
    pub const ALL: [Direction; 2] = [Direction::Inner, Direction::Outer];
}
impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inner => write!(f, "inner"),
            Direction::Outer => write!(f, "outer"),
        }
    }
}

/// The installation status of a single elevator car position.
///
/// Written as its lowercase name; reading also accepts the short workbook tokens.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SlotStatus {
    /// No elevator, and none can be built
    Absent,
    /// A candidate site for a new elevator
    Installable,
    /// An elevator already in service
    Installed,
}
impl SlotStatus {
    /// Reads a status name or workbook token, returning `None` if it is not recognised
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "" | "N" | "n" | "-" | "0" | "absent" => Some(SlotStatus::Absent),
            "Y" | "y" | "installable" => Some(SlotStatus::Installable),
            "e" | "E" | "installed" => Some(SlotStatus::Installed),
            _ => None,
        }
    }
}
impl TryFrom<String> for SlotStatus {
    type Error = String;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        Self::from_token(&token).ok_or_else(|| format!("unrecognised elevator status '{token}'"))
    }
}

/// A directly recorded distance from one station to another
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DistanceEntry {
    pub from: String,
    pub to: String,
    pub distance: f64,
}

/// The elevator statuses along one station's platforms, one entry per car position
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct PlatformDescription {
    pub station: String,
    #[serde(default)]
    pub inner: Vec<SlotStatus>,
    #[serde(default)]
    pub outer: Vec<SlotStatus>,
}
impl PlatformDescription {
    /// The statuses recorded for one direction
    pub fn statuses(&self, direction: Direction) -> &[SlotStatus] {
        match direction {
            Direction::Inner => &self.inner,
            Direction::Outer => &self.outer,
        }
    }
}

/// A description of a circular line and its platforms
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ProblemDescription {
    /// Station identifiers, in loop order
    pub stations: Vec<String>,
    /// Directional distances between stations; later entries override earlier ones
    #[serde(default)]
    pub distances: Vec<DistanceEntry>,
    /// Elevator statuses per station
    #[serde(default)]
    pub platforms: Vec<PlatformDescription>,
}

/// An elevator placement problem: the validated structures built from its description
#[derive(Debug, Clone)]
pub struct Problem {
    pub station_loop: StationLoop,
    pub distances: DirectedDistances,
    pub accessibility: AccessibilityIndex,
}
impl Problem {
    /// Validate a description and build the read-only structures the evaluator needs
    pub fn new(description: ProblemDescription) -> Result<Self, ProblemError> {
        let station_loop = StationLoop::new(&description.stations)?;
        let distances = DirectedDistances::new(&station_loop, &description.distances)?;
        let accessibility = AccessibilityIndex::new(&station_loop, &description.platforms)?;
        log::info!(
            "loaded loop of {} stations, {} recorded distances, {} elevator slots ({} installable)",
            station_loop.len(),
            distances.recorded(),
            accessibility.slots().len(),
            accessibility.max_installations()
        );
        Ok(Self {
            station_loop,
            distances,
            accessibility,
        })
    }
}
