//! Error types for timesort-rs

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::timestamp::BasecallerVariant;

/// Result type alias for timesort-rs operations
pub type Result<T> = std::result::Result<T, TimesortError>;

/// Problems with the run configuration, detected before any input is read.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("threshold list is empty")]
    EmptyThresholds,

    #[error("threshold values must be positive, got {value}")]
    NonPositiveThreshold { value: String },

    #[error("thresholds must be strictly ascending: {value} follows {previous}")]
    NotAscending { previous: String, value: String },

    #[error("{what} must be a whole number, got '{input}'")]
    NotWhole { what: &'static str, input: String },

    #[error("cannot parse '{0}' as a number (K/M/G suffixes allowed)")]
    BadMagnitude(String),

    #[error("genome size must be positive, got '{0}'")]
    BadGenomeSize(String),

    #[error("coverage thresholds need a genome size (-g)")]
    MissingGenomeSize,

    #[error("one threshold list is required: --bases, --coverage or --time")]
    NoThresholds,

    #[error("only one of --bases, --coverage and --time may be given")]
    MultipleThresholds,
}

/// Error types that can occur while replaying a run
#[derive(Debug, Error)]
pub enum TimesortError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid FASTQ structure
    #[error("Invalid FASTQ format at record {record}: {msg}")]
    InvalidFastq { record: usize, msg: String },

    /// The header carries no timestamp for the selected basecaller
    #[error("read {read_id} (record {record}) has no {variant} timestamp field")]
    MissingTimestamp {
        record: usize,
        read_id: String,
        variant: BasecallerVariant,
    },

    /// The timestamp field exists but is not a time
    #[error("read {read_id} (record {record}) has malformed timestamp '{value}'")]
    MalformedTimestamp {
        record: usize,
        read_id: String,
        value: String,
    },

    /// Writing one threshold's archive failed; `written` lists the files that made it
    #[error("failed to write output for {label} ({} file(s) already written): {source}", .written.len())]
    Emit {
        label: String,
        written: Vec<PathBuf>,
        #[source]
        source: io::Error,
    },

    #[error("JSON report error: {0}")]
    Json(#[from] serde_json::Error),
}
