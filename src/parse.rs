//! Parses a problem from a file to the internal problem representation.
//!
//! A problem is either a TOML file holding a `ProblemDescription`, or a workbook directory of
//! headerless CSV sheets: `inner.csv` and `outer.csv` (station, then one status per car) and
//! `distances.csv` (from, to, distance).

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::EvaluationConfig,
    error::{AppError, ParseError},
    problem::{Direction, DistanceEntry, PlatformDescription, Problem, ProblemDescription, SlotStatus},
};

pub const INNER_SHEET: &str = "inner.csv";
pub const OUTER_SHEET: &str = "outer.csv";
pub const DISTANCE_SHEET: &str = "distances.csv";

fn read_file(path: &Path) -> Result<String, ParseError> {
    fs::read_to_string(path).map_err(|source| ParseError::IoError { path: path.to_path_buf(), source })
}

/// Reads and validates a problem from a TOML file or a workbook directory
pub fn parse_problem(path: &Path) -> Result<Problem, AppError> {
    let description = if path.is_dir() {
        log::info!("reading workbook directory {}", path.display());
        read_workbook(path)?
    } else {
        log::info!("reading problem file {}", path.display());
        read_description(path)?
    };
    Ok(Problem::new(description)?)
}

/// Reads a problem description in TOML format
pub fn read_description(path: &Path) -> Result<ProblemDescription, ParseError> {
    Ok(toml::from_str(&read_file(path)?)?)
}

/// Saves a problem description in TOML format to a file
pub fn save_description(path: &Path, description: &ProblemDescription) -> Result<(), ParseError> {
    let contents = toml::to_string(description)?;
    fs::write(path, contents).map_err(|source| ParseError::IoError { path: path.to_path_buf(), source })
}

/// Reads run settings, falling back to the defaults when no file is given
pub fn read_config(path: Option<&Path>) -> Result<EvaluationConfig, ParseError> {
    match path {
        None => Ok(EvaluationConfig::default()),
        Some(p) => {
            log::info!("reading configuration from {}", p.display());
            Ok(toml::from_str(&read_file(p)?)?)
        }
    }
}

fn sheet_reader(path: &Path) -> Result<csv::Reader<fs::File>, ParseError> {
    let file = fs::File::open(path).map_err(|source| ParseError::IoError { path: path.to_path_buf(), source })?;
    Ok(csv::ReaderBuilder::new().has_headers(false).flexible(true).from_reader(file))
}

/// Reads one direction's sheet: a row per station, the station first and then a status per car
fn read_status_sheet(path: &Path) -> Result<Vec<(String, Vec<SlotStatus>)>, ParseError> {
    let mut rows = vec![];
    for record in sheet_reader(path)?.records() {
        let record = record?;
        let station = match record.get(0).map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => continue,
        };
        let statuses = record
            .iter()
            .skip(1)
            .map(|token| {
                SlotStatus::from_token(token).ok_or_else(|| ParseError::InvalidStatus {
                    station: station.clone(),
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push((station, statuses));
    }
    Ok(rows)
}

fn read_distance_sheet(path: &Path) -> Result<Vec<DistanceEntry>, ParseError> {
    let mut entries = vec![];
    for record in sheet_reader(path)?.records() {
        let record = record?;
        if record.len() < 3 {
            log::warn!("skipping distance row with {} fields in {}", record.len(), path.display());
            continue;
        }
        let (from, to, token) = (record[0].trim(), record[1].trim(), record[2].trim());
        let distance = token.parse::<f64>().map_err(|_| ParseError::InvalidDistance {
            from: from.to_string(),
            to: to.to_string(),
            token: token.to_string(),
        })?;
        entries.push(DistanceEntry { from: from.to_string(), to: to.to_string(), distance });
    }
    Ok(entries)
}

/// Reads the three sheets of a workbook directory. The loop order is the station column of the
/// inner sheet.
pub fn read_workbook(directory: &Path) -> Result<ProblemDescription, ParseError> {
    let sheet = |name: &str| -> PathBuf { directory.join(name) };
    let mut description = ProblemDescription::default();
    for (direction, name) in [(Direction::Inner, INNER_SHEET), (Direction::Outer, OUTER_SHEET)] {
        let mut seen = HashSet::new();
        for (station, statuses) in read_status_sheet(&sheet(name))? {
            if direction == Direction::Inner {
                description.stations.push(station.clone());
            } else if !seen.insert(station.clone()) {
                log::warn!("station '{station}' appears twice in {name}, keeping the later row");
            }
            let i = match description.platforms.iter().position(|p| p.station == station) {
                Some(i) => i,
                None => {
                    description.platforms.push(PlatformDescription { station, ..Default::default() });
                    description.platforms.len() - 1
                }
            };
            let platform = &mut description.platforms[i];
            match direction {
                Direction::Inner => platform.inner = statuses,
                Direction::Outer => platform.outer = statuses,
            }
        }
    }
    description.distances = read_distance_sheet(&sheet(DISTANCE_SHEET))?;
    Ok(description)
}
