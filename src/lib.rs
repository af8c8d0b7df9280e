//! # timesort-rs
//!
//! Replays a finished nanopore sequencing run as if the sequencer had been
//! stopped early. Reads are put back into the order they were produced (by
//! the `start_time` the basecaller wrote into each header), then cut into
//! cumulative snapshots at ascending base-count, coverage or elapsed-time
//! thresholds. Each snapshot is written as its own `.fastq.gz`, alongside a
//! stats report giving reads, bases, elapsed time and coverage per snapshot.
//!
//! ```no_run
//! use timesort_rs::config::RunConfig;
//! use timesort_rs::partition::ThresholdSpec;
//! use timesort_rs::timestamp::BasecallerVariant;
//!
//! # fn main() -> timesort_rs::Result<()> {
//! let config = RunConfig {
//!     input: "run.fastq.gz".into(),
//!     out_dir: "realtime".into(),
//!     prefix: "run".into(),
//!     thresholds: ThresholdSpec::coverage(vec![1.0, 5.0, 10.0], Some(5_000_000))?,
//!     genome_size: Some(5_000_000),
//!     basecaller: BasecallerVariant::Guppy,
//!     json: None,
//!     compression: 4,
//!     threads: 1,
//! };
//! let summary = timesort_rs::run(&config)?;
//! println!("{} snapshots", summary.outputs.len());
//! # Ok(())
//! # }
//! ```

pub mod compress;
pub mod config;
pub mod emit;
pub mod error;
pub mod fastq;
pub mod partition;
pub mod stats;
pub mod timestamp;

pub use error::{ConfigError, Result, TimesortError};

use std::fs;
use std::io;
use std::path::PathBuf;

use log::info;

use crate::config::RunConfig;
use crate::emit::{EmittedFile, Emitter};
use crate::fastq::Reader;
use crate::partition::{Partitioner, SortedReads};
use crate::stats::{write_json_report, write_text_report_file, RunReport};

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: RunReport,
    pub outputs: Vec<EmittedFile>,
    pub stats_path: PathBuf,
}

/// Load, sort, partition and write one run.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    fs::create_dir_all(&config.out_dir).map_err(|e| with_path(e, &config.out_dir))?;

    info!("reading {} ({} headers)", config.input.display(), config.basecaller);
    let reads = Reader::from_path(&config.input)
        .map_err(|e| with_path(e, &config.input))?
        .read_all(config.basecaller)?;
    info!("loaded {} reads", reads.len());

    let sorted = SortedReads::from_reads(reads);
    if let Some(first) = sorted.first_timestamp() {
        info!(
            "sorted by start time; run spans {} from t={}",
            stats::format_duration(sorted.elapsed_seconds(sorted.len())),
            first
        );
    }

    let partitions = Partitioner::new(&sorted).partition(&config.thresholds);
    let kind = config.thresholds.kind();
    let genome_size = config.thresholds.genome_size().or(config.genome_size);
    let report = RunReport::build(
        &config.input.display().to_string(),
        config.basecaller,
        kind,
        &sorted,
        &partitions,
        genome_size,
    );

    let emitter = Emitter::from_config(config);
    let outputs = emitter.emit(&partitions)?;

    let stats_path = emitter.stats_path(kind);
    write_text_report_file(&stats_path, &report).map_err(|e| with_path(e, &stats_path))?;
    info!("stats written to {}", stats_path.display());
    if let Some(json) = &config.json {
        write_json_report(json, &report)?;
        info!("JSON stats written to {}", json.display());
    }

    Ok(RunSummary {
        report,
        outputs,
        stats_path,
    })
}

fn with_path(e: io::Error, path: &std::path::Path) -> io::Error {
    io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
}
