use std::{fs, path::Path};

use itertools::Itertools;

use crate::{
    accessibility::transfer_distance,
    config::{EvaluationConfig, ImprovementRatio},
    error::{AppError, EvaluationError, ParseError, ProblemError},
    evaluate::{improvement, InstallationEvaluator},
    generate::{gen_random_problem, GeneratorParams},
    parse::{parse_problem, read_description, read_workbook, save_description},
    problem::{Direction, DistanceEntry, PlatformDescription, Problem, ProblemDescription, SlotStatus},
    report::{count_file_name, write_report, ResultRow, SUMMARY_FILE},
};
use Direction::*;
use SlotStatus::*;

fn loop_of(stations: &[&str], distances: &[(&str, &str, f64)], platforms: Vec<PlatformDescription>) -> ProblemDescription {
    ProblemDescription {
        stations: stations.iter().map(|s| s.to_string()).collect(),
        distances: distances
            .iter()
            .map(|&(from, to, distance)| DistanceEntry { from: from.to_string(), to: to.to_string(), distance })
            .collect(),
        platforms,
    }
}

fn platform(station: &str, inner: Vec<SlotStatus>, outer: Vec<SlotStatus>) -> PlatformDescription {
    PlatformDescription { station: station.to_string(), inner, outer }
}

fn same_direction() -> EvaluationConfig {
    EvaluationConfig { transfer_directions: [Inner, Inner], ..Default::default() }
}

fn random_params(n: usize) -> GeneratorParams {
    GeneratorParams { n, cars: 6, ..Default::default() }
}

/// Tests saving and loading capabilities, ensuring that
/// problem data is consistently (de)serialised.
#[test]
fn test_problem_serde() {
    let description = gen_random_problem(&random_params(10), 7);
    let path = std::env::temp_dir().join("__elevator_placement_test.toml");
    save_description(&path, &description).unwrap();
    let description2 = read_description(&path).unwrap();
    assert_eq!(description, description2, "Ensure problem data (de)serialises consistently");
    fs::remove_file(&path).unwrap();
}

/// Only direct entries are used: a recorded `C -> A` resolves the pair `A, C`
#[test]
fn test_route_distance_example() {
    let problem = Problem::new(loop_of(&["A", "B", "C"], &[("A", "B", 2.0), ("B", "C", 2.0), ("C", "A", 2.0)], vec![])).unwrap();
    let d = &problem.distances;
    assert_eq!(d.route_distance(0, 1), Some(2.0));
    assert_eq!(d.route_distance(1, 2), Some(2.0));
    assert_eq!(d.route_distance(0, 2), Some(2.0), "Ensure the reverse entry is used when only it exists");

    let results = InstallationEvaluator::new(&problem, &EvaluationConfig::default()).run().unwrap();
    assert_eq!(results.len(), 1, "Ensure a problem with no candidates only has the baseline");
    assert_eq!(results[0].total_station_distance, 6.0);
    assert_eq!(results[0].evaluated_pairs, 3);
}

/// Ensures both directions resolve to their minimum, and missing entries stay unknown
#[test]
fn test_route_distance_minimum() {
    let problem = Problem::new(loop_of(
        &["A", "B", "C", "D"],
        &[("A", "B", 3.0), ("B", "A", 1.5), ("B", "C", 0.0)],
        vec![],
    ))
    .unwrap();
    let d = &problem.distances;
    assert_eq!(d.route_distance(0, 1), Some(1.5));
    assert_eq!(d.route_distance(1, 0), d.route_distance(0, 1), "Ensure the value is symmetric when both entries exist");
    assert_eq!(d.route_distance(1, 2), Some(0.0), "Ensure a zero distance is known, not unknown");
    assert_eq!(d.route_distance(0, 3), None, "Ensure pairs without direct entries are unknown");
    assert_eq!(d.route_distance(0, 2), None, "Ensure no multi-hop route is taken");
}

/// Ensures loop adjacency wraps around in both directions
#[test]
fn test_loop_neighbours() {
    let problem = Problem::new(loop_of(&["A", "B", "C"], &[("A", "B", 2.0), ("A", "C", 4.0)], vec![])).unwrap();
    let station_loop = &problem.station_loop;
    assert_eq!(station_loop.neighbour(2, Inner), 0);
    assert_eq!(station_loop.neighbour(0, Outer), 2);
    assert_eq!(station_loop.neighbour(1, Outer), 0);
    assert_eq!(station_loop.pair_count(), 3);
    assert_eq!(station_loop.station(2).index, 2);

    let edges = station_loop.edges(&problem.distances);
    assert_eq!(edges.len(), 6, "Ensure every station has an inner and an outer edge");
    assert_eq!((edges[0].from, edges[0].to, edges[0].direction, edges[0].distance), (0, 1, Inner, Some(2.0)));
    assert_eq!((edges[1].from, edges[1].to, edges[1].direction, edges[1].distance), (0, 2, Outer, Some(4.0)));
    assert_eq!(edges[2].distance, None);

    let single = Problem::new(loop_of(&["A"], &[], vec![])).unwrap();
    assert!(single.station_loop.edges(&single.distances).is_empty(), "Ensure a single station has no edges");
}

/// An installable elevator only counts once it has been activated
#[test]
fn test_transfer_example() {
    let problem = Problem::new(loop_of(
        &["A", "B"],
        &[],
        vec![platform("A", vec![Installable, Absent, Installable], vec![]), platform("B", vec![Absent, Installed], vec![])],
    ))
    .unwrap();
    let index = &problem.accessibility;
    assert_eq!(index.max_installations(), 2);

    let active = index.active_slots(0);
    assert_eq!(transfer_distance(index, &active, 0, Inner, 1, Inner), None, "Ensure A has no usable elevator yet");

    let active = index.active_slots(1);
    assert_eq!(transfer_distance(index, &active, 0, Inner, 1, Inner), Some(1));
    assert_eq!(transfer_distance(index, &active, 1, Inner, 0, Inner), Some(1));

    let active = index.active_slots(2);
    assert_eq!(transfer_distance(index, &active, 0, Inner, 1, Inner), Some(1));
}

/// Elevators serving different directions are never paired
#[test]
fn test_transfer_direction_mismatch() {
    let problem = Problem::new(loop_of(
        &["A", "B"],
        &[],
        vec![platform("A", vec![Installed], vec![Installed]), platform("B", vec![Installed], vec![Installed])],
    ))
    .unwrap();
    let index = &problem.accessibility;
    let active = index.active_slots(0);
    assert_eq!(transfer_distance(index, &active, 0, Inner, 1, Outer), None);
    assert_eq!(transfer_distance(index, &active, 0, Outer, 1, Outer), Some(0));

    let results = InstallationEvaluator::new(&problem, &EvaluationConfig::default()).run().unwrap();
    assert_eq!(results[0].total_transfer_distance, 0.0, "Ensure the default direction pair never resolves");
}

/// A platform without elevator slots leaves its pairs unknown, but they are still counted
#[test]
fn test_empty_accessibility() {
    let problem = Problem::new(loop_of(
        &["A", "B", "C"],
        &[("A", "B", 2.0), ("B", "C", 2.0), ("C", "A", 2.0)],
        vec![platform("A", vec![Installed], vec![]), platform("B", vec![], vec![Installed])],
    ))
    .unwrap();
    let index = &problem.accessibility;
    let active = index.active_slots(0);
    assert_eq!(transfer_distance(index, &active, 0, Inner, 1, Inner), None, "Ensure an empty inner platform is unknown");
    assert_eq!(transfer_distance(index, &active, 0, Inner, 2, Inner), None, "Ensure a station without a platform is unknown");
    assert_eq!(transfer_distance(index, &active, 0, Outer, 1, Outer), None, "Ensure an empty outer platform is unknown");

    let results = InstallationEvaluator::new(&problem, &same_direction()).run().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].total_transfer_distance, 0.0, "Ensure unknown transfers are left out of the total");
    assert_eq!(results[0].total_station_distance, 6.0);
    assert_eq!(results[0].evaluated_pairs, 3);
    assert_eq!(results[0].transfer_distance_per_pair, 0.0);
}

/// Ensures TOML and workbook input accept the same status tokens
#[test]
fn test_status_tokens() {
    let text = r#"
        stations = ["A"]
        [[platforms]]
        station = "A"
        inner = ["Y", "y", "installable", "e", "E", "installed"]
        outer = ["N", "n", "-", "0", "", "absent"]
    "#;
    let description: ProblemDescription = toml::from_str(text).unwrap();
    assert_eq!(description.platforms[0].inner, vec![Installable, Installable, Installable, Installed, Installed, Installed]);
    assert_eq!(description.platforms[0].outer, vec![Absent; 6]);
    for token in ["Y", "y", "e", "E", "N", "n", "-", "0", "", "absent", "installable", "installed"] {
        let parsed: PlatformDescription = toml::from_str(&format!("station = \"A\"\ninner = [\"{token}\"]")).unwrap();
        assert_eq!(Some(parsed.inner[0]), SlotStatus::from_token(token), "Ensure '{token}' reads the same from both formats");
    }
    assert!(toml::from_str::<PlatformDescription>("station = \"A\"\ninner = [\"X\"]").is_err());
    let written = toml::to_string(&platform("A", vec![Installable], vec![])).unwrap();
    assert!(written.contains("\"installable\""), "Ensure statuses are written by name");
}

/// Ensures the workbook sheets are read into the same model as a TOML file
#[test]
fn test_read_workbook() {
    let description = read_workbook(Path::new("test_workbook")).unwrap();
    assert_eq!(description.stations, vec!["A", "B", "C"]);
    assert_eq!(description.distances.len(), 4, "Ensure the short row is skipped");
    assert_eq!(description.platforms[0], platform("A", vec![Installable, Absent, Installable], vec![Absent, Absent]));
    assert_eq!(description.platforms[2], platform("C", vec![], vec![Installed]));

    let problem = parse_problem(Path::new("test_workbook")).unwrap();
    assert_eq!(problem.distances.route_distance(0, 1), Some(1.5));
    let labels = problem.accessibility.candidates().map(|s| s.label(&problem.station_loop).to_string()).collect_vec();
    assert_eq!(labels, vec!["A_1_inner", "A_3_inner", "B_1_outer"], "Ensure candidates are in discovery order");
}

/// Ensures unrecognised status tokens are rejected
#[test]
fn test_invalid_status() {
    let directory = std::env::temp_dir().join("__elevator_placement_bad_workbook");
    fs::create_dir_all(&directory).unwrap();
    fs::write(directory.join("inner.csv"), "A,Y,X\n").unwrap();
    fs::write(directory.join("outer.csv"), "A,N\n").unwrap();
    fs::write(directory.join("distances.csv"), "").unwrap();
    let result = read_workbook(&directory);
    assert!(matches!(result, Err(ParseError::InvalidStatus { ref token, .. }) if token == "X"));
    fs::remove_dir_all(&directory).unwrap();
}

/// A station repeated in the outer sheet keeps its later row
#[test]
fn test_workbook_repeated_row() {
    let directory = std::env::temp_dir().join("__elevator_placement_repeated_workbook");
    fs::create_dir_all(&directory).unwrap();
    fs::write(directory.join("inner.csv"), "A,Y\nB,e\n").unwrap();
    fs::write(directory.join("outer.csv"), "A,N,e\nB,Y\nA,Y\n").unwrap();
    fs::write(directory.join("distances.csv"), "A,B,1\n").unwrap();
    let description = read_workbook(&directory).unwrap();
    assert_eq!(description.stations, vec!["A", "B"]);
    assert_eq!(description.platforms.len(), 2);
    assert_eq!(description.platforms[0], platform("A", vec![Installable], vec![Installable]));
    fs::remove_dir_all(&directory).unwrap();
}

/// Ensures structural defects abort loading
#[test]
fn test_problem_errors() {
    let duplicate = Problem::new(loop_of(&["A", "B", "A"], &[], vec![]));
    assert_eq!(duplicate.unwrap_err(), ProblemError::DuplicateStation(String::from("A")));

    let unknown = Problem::new(loop_of(&["A", "B"], &[("A", "Z", 1.0)], vec![]));
    assert!(matches!(unknown, Err(ProblemError::UnknownStation { ref station, .. }) if station == "Z"));

    let negative = Problem::new(loop_of(&["A", "B"], &[("A", "B", -1.0)], vec![]));
    assert!(matches!(negative, Err(ProblemError::InvalidDistance { .. })));

    let platform_off_loop = Problem::new(loop_of(&["A", "B"], &[], vec![platform("Q", vec![Installed], vec![])]));
    assert!(matches!(platform_off_loop, Err(ProblemError::UnknownStation { .. })));

    let missing = parse_problem(Path::new("__does_not_exist.toml"));
    assert!(matches!(missing, Err(AppError::Parse(ParseError::IoError { .. }))));
}

/// Evaluates the fixture problem step by step
#[test]
fn test_evaluate_fixture() {
    let problem = parse_problem(Path::new("test_problem.toml")).unwrap();
    let results = InstallationEvaluator::new(&problem, &same_direction()).run().unwrap();
    assert_eq!(results.len(), 3);

    let transfers = results.iter().map(|r| r.total_transfer_distance).collect_vec();
    assert_eq!(transfers, vec![2.0, 6.0, 4.0]);
    assert!(results.iter().all(|r| r.total_station_distance == 6.0 && r.evaluated_pairs == 3));
    assert_eq!(results[0].installed_slots, Vec::<String>::new());
    assert_eq!(results[1].installed_slots, vec!["A_1_inner"]);
    assert_eq!(results[2].installed_slots, vec!["A_1_inner", "A_3_inner"]);
    assert_eq!(results[2].transfer_distance_per_pair, 4.0 / 3.0);

    assert_eq!(results[0].improvement_ratio, 0.0);
    assert!((results[1].improvement_ratio + 2.0).abs() < 1e-12);
    assert!((results[2].improvement_ratio + 1.0).abs() < 1e-12);
}

/// Ensures the improvement ratio follows the configured mode
#[test]
fn test_improvement() {
    assert_eq!(improvement(ImprovementRatio::Relative, 2.0, 1.5), 0.25);
    assert_eq!(improvement(ImprovementRatio::Relative, 0.0, 0.0), 0.0, "Ensure a zero baseline does not divide by zero");
    assert_eq!(improvement(ImprovementRatio::Fixed(10.0), 2.0, 1.5), 10.0);

    let config: EvaluationConfig = toml::from_str("improvement_ratio = { fixed = 10.0 }\nparallel = true").unwrap();
    assert_eq!(config.improvement_ratio, ImprovementRatio::Fixed(10.0));
    assert_eq!(config.transfer_directions, [Inner, Outer], "Ensure unset keys keep their defaults");
    assert!(config.parallel);
    assert!(toml::from_str::<EvaluationConfig>("parralel = true").is_err(), "Ensure misspelt keys are rejected");
}

/// Ensures every count evaluates every pair and lists the installed candidates in order
#[test]
fn test_pair_count_and_labels() {
    for (n, seed) in [(1, 1), (2, 2), (5, 3), (12, 4)] {
        let problem = Problem::new(gen_random_problem(&random_params(n), seed)).unwrap();
        let results = InstallationEvaluator::new(&problem, &same_direction()).run().unwrap();
        let max = problem.accessibility.max_installations();
        assert_eq!(results.len(), max + 1);
        for (count, result) in results.iter().enumerate() {
            assert_eq!(result.installed_count, count);
            assert_eq!(result.evaluated_pairs, n * (n - 1) / 2, "Ensure unknown pairs are still counted");
            assert_eq!(result.installed_slots.len(), count);
        }
        let all = problem.accessibility.candidates().map(|s| s.label(&problem.station_loop).to_string()).collect_vec();
        assert_eq!(results[max].installed_slots, all);
        assert!(all.iter().all_unique());
        if n < 2 {
            assert_eq!(results[0].transfer_distance_per_pair, 0.0);
        }
    }
}

/// A known transfer never gets longer, and never becomes unknown, as elevators are added
#[test]
fn test_transfer_never_worsens() {
    for seed in 0..5 {
        let problem = Problem::new(gen_random_problem(&random_params(8), seed)).unwrap();
        let index = &problem.accessibility;
        let mut active = index.active_slots(0);
        let mut previous = problem
            .station_loop
            .pairs()
            .map(|(a, b)| transfer_distance(index, &active, a, Inner, b, Inner))
            .collect_vec();
        while active.activate_next(index) {
            let current = problem
                .station_loop
                .pairs()
                .map(|(a, b)| transfer_distance(index, &active, a, Inner, b, Inner))
                .collect_vec();
            for (before, after) in previous.iter().zip(&current) {
                if let Some(before) = before {
                    assert!(matches!(after, Some(after) if after <= before));
                }
            }
            previous = current;
        }
    }
}

/// With an elevator on every platform from the start, the totals can only go down
#[test]
fn test_served_loop_monotone() {
    for seed in 0..5 {
        let mut description = gen_random_problem(&random_params(9), seed);
        for platform in &mut description.platforms {
            platform.inner[0] = Installed;
        }
        let problem = Problem::new(description).unwrap();
        let results = InstallationEvaluator::new(&problem, &same_direction()).run().unwrap();
        for (before, after) in results.iter().tuple_windows() {
            assert!(after.total_transfer_distance <= before.total_transfer_distance);
            assert!(after.transfer_distance_per_pair <= before.transfer_distance_per_pair);
            assert!(after.improvement_ratio >= before.improvement_ratio);
        }
    }
}

/// Ensures repeated and parallel runs give identical results
#[test]
fn test_idempotent_and_parallel() {
    let problem = Problem::new(gen_random_problem(&random_params(15), 11)).unwrap();
    let sequential = same_direction();
    let parallel = EvaluationConfig { parallel: true, ..same_direction() };
    let first = InstallationEvaluator::new(&problem, &sequential).run().unwrap();
    let second = InstallationEvaluator::new(&problem, &sequential).run().unwrap();
    let third = InstallationEvaluator::new(&problem, &parallel).run().unwrap();
    assert_eq!(first, second, "Ensure evaluation is repeatable");
    assert_eq!(first, third, "Ensure parallel evaluation matches sequential evaluation");
}

/// A candidate list out of step with the installable count fails before any evaluation
#[test]
fn test_inconsistent_candidates() {
    let mut problem = parse_problem(Path::new("test_problem.toml")).unwrap();
    problem.accessibility.installable += 1;
    let result = InstallationEvaluator::new(&problem, &EvaluationConfig::default()).run();
    assert_eq!(result, Err(EvaluationError::InconsistentCandidateCount { candidates: 2, installable: 3 }));
}

/// Ensures the summary and per-count tables are written
#[test]
fn test_write_report() {
    let problem = parse_problem(Path::new("test_problem.toml")).unwrap();
    let results = InstallationEvaluator::new(&problem, &same_direction()).run().unwrap();
    let directory = std::env::temp_dir().join("__elevator_placement_report");
    let summary = write_report(&directory, &results).unwrap();
    assert_eq!(summary, directory.join(SUMMARY_FILE));

    let rows = csv::Reader::from_path(&summary)
        .unwrap()
        .into_deserialize::<ResultRow>()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(rows, results.iter().map(ResultRow::from).collect_vec());
    assert_eq!(rows[2].installed_slots, "A_1_inner,A_3_inner");
    for count in 0..results.len() {
        assert!(directory.join(count_file_name(count)).exists());
    }
    fs::remove_dir_all(&directory).unwrap();
}
