//! Error types for loading, evaluating and reporting

use std::path::PathBuf;

use thiserror::Error;

/// A structural defect in a problem description
#[derive(Error, Debug, PartialEq)]
pub enum ProblemError {
    #[error("station '{0}' appears more than once in the loop")]
    DuplicateStation(String),
    #[error("{context} refers to station '{station}', which is not on the loop")]
    UnknownStation { context: String, station: String },
    #[error("distance {from} -> {to} must be a non-negative number, found {value}")]
    InvalidDistance { from: String, to: String, value: f64 },
}

/// Failure reading a problem or configuration file
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed reading '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed decoding TOML: {source}")]
    TomlError {
        #[from]
        source: toml::de::Error,
    },
    #[error("failed encoding TOML: {source}")]
    TomlWriteError {
        #[from]
        source: toml::ser::Error,
    },
    #[error("failed reading CSV: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },
    #[error("unrecognised elevator status '{token}' at station '{station}'")]
    InvalidStatus { station: String, token: String },
    #[error("cannot read distance '{token}' for {from} -> {to}")]
    InvalidDistance {
        from: String,
        to: String,
        token: String,
    },
}

/// An internal inconsistency detected before evaluation starts
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("candidate list holds {candidates} slots but {installable} slots are installable")]
    InconsistentCandidateCount {
        candidates: usize,
        installable: usize,
    },
}

/// Failure writing evaluation results
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed writing '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed writing CSV: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },
}

/// Any failure of a command line run
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid problem: {0}")]
    Problem(#[from] ProblemError),
    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),
    #[error("report failed: {0}")]
    Report(#[from] ReportError),
}
