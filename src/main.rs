#![warn(rust_2018_idioms)]

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use itertools::Itertools;

use crate::{
    error::AppError,
    evaluate::InstallationEvaluator,
    generate::{gen_random_problem, GeneratorParams},
    parse::{parse_problem, read_config, save_description},
    problem::Problem,
};

mod accessibility;
mod config;
mod error;
mod evaluate;
mod generate;
mod parse;
mod problem;
mod report;
mod station_loop;
#[cfg(test)]
mod test;

/// Evaluates how installing elevators one candidate at a time shortens
/// walking distances inside the platforms of a circular line
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArguments {
    #[command(subcommand)]
    op: Operation,
}

#[derive(Subcommand)]
pub enum Operation {
    /// evaluate every installation count and write the result tables
    Evaluate {
        #[arg(long, help = "problem TOML file, or a directory with inner.csv, outer.csv and distances.csv")]
        problem: PathBuf,
        #[arg(long, help = "TOML file with evaluation settings")]
        config: Option<PathBuf>,
        #[arg(long, help = "directory for the result tables, defaults to a timestamped name")]
        output_directory: Option<PathBuf>,
    },
    /// show the loop edges and the candidate list without evaluating
    Inspect {
        #[arg(long, help = "problem TOML file or workbook directory")]
        problem: PathBuf,
    },
    /// write a random loop problem as TOML
    Generate {
        #[arg(long, default_value_t = 10)]
        stations: usize,
        #[arg(long, default_value_t = 10)]
        cars: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        output: PathBuf,
    },
}

fn run_evaluation(problem_path: &Path, config_path: Option<&Path>, output_directory: Option<&Path>) -> Result<(), AppError> {
    let config = read_config(config_path)?;
    let problem = parse_problem(problem_path)?;
    let results = InstallationEvaluator::new(&problem, &config).run()?;
    if let (Some(first), Some(last)) = (results.first(), results.last()) {
        log::info!(
            "transfer distance per pair {:.4} with no new elevators, {:.4} with {}",
            first.transfer_distance_per_pair,
            last.transfer_distance_per_pair,
            last.installed_count
        );
    }
    let directory = match output_directory {
        Some(d) => d.to_path_buf(),
        None => report::timestamped_directory(&config.output_prefix),
    };
    let summary = report::write_report(&directory, &results)?;
    println!("saved results to {}", summary.display());
    Ok(())
}

fn inspect(problem: &Problem) {
    let station_loop = &problem.station_loop;
    for edge in station_loop.edges(&problem.distances) {
        let distance = edge.distance.map_or_else(|| String::from("unknown"), |d| d.to_string());
        println!(
            "{} -> {} ({}): {}",
            station_loop.station(edge.from).id,
            station_loop.station(edge.to).id,
            edge.direction,
            distance
        );
    }
    println!(
        "{} candidates: {}",
        problem.accessibility.max_installations(),
        problem.accessibility.candidates().map(|slot| slot.label(station_loop)).join(",")
    );
}

fn run(op: &Operation) -> Result<(), AppError> {
    match op {
        Operation::Evaluate { problem, config, output_directory } => {
            run_evaluation(problem, config.as_deref(), output_directory.as_deref())
        }
        Operation::Inspect { problem } => {
            inspect(&parse_problem(problem)?);
            Ok(())
        }
        Operation::Generate { stations, cars, seed, output } => {
            let params = GeneratorParams { n: *stations, cars: *cars, ..Default::default() };
            save_description(output, &gen_random_problem(&params, *seed))?;
            log::info!("wrote random problem with {stations} stations to {}", output.display());
            Ok(())
        }
    }
}

fn main() {
    env_logger::init();
    let args = CliArguments::parse();
    if let Err(e) = run(&args.op) {
        log::error!("failed: {e}");
        std::process::exit(1);
    }
}
