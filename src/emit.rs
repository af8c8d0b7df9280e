//! Writes one cumulative `.fastq.gz` per partition.
//!
//! Snapshot *k* is snapshot *k-1* plus the reads that arrived in between, so
//! each file is built by copying the previous one and appending a fresh gzip
//! member holding only the new reads. Concatenated gzip members are a valid
//! gzip stream.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::compress::{gzip_member, CompressionPool};
use crate::config::RunConfig;
use crate::error::{Result, TimesortError};
use crate::fastq::{to_fastq_bytes, Read};
use crate::partition::{Partition, ThresholdKind};

#[derive(Debug, Clone, PartialEq)]
pub struct EmittedFile {
    pub label: String,
    pub path: PathBuf,
    pub reads: usize,
    pub reachable: bool,
}

pub struct Emitter {
    out_dir: PathBuf,
    prefix: String,
    level: u32,
    threads: usize,
}

impl Emitter {
    pub fn new(out_dir: impl Into<PathBuf>, prefix: impl Into<String>, level: u32, threads: usize) -> Self {
        Self {
            out_dir: out_dir.into(),
            prefix: prefix.into(),
            level,
            threads: threads.max(1),
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(&config.out_dir, &config.prefix, config.compression, config.threads)
    }

    /// `<out_dir>/<prefix>.<label>.fastq.gz`
    pub fn output_path(&self, label: &str) -> PathBuf {
        self.out_dir.join(format!("{}.{}.fastq.gz", self.prefix, label))
    }

    /// `<out_dir>/<prefix>.<kind>_stats.txt`
    pub fn stats_path(&self, kind: ThresholdKind) -> PathBuf {
        self.out_dir.join(format!("{}.{}_stats.txt", self.prefix, kind.tag()))
    }

    /// Write every partition in order. Partitions must be ascending prefixes
    /// of the same sorted reads, as the partitioner produces them.
    ///
    /// Stops at the first failure; files written before it are left in place
    /// and listed in the error.
    pub fn emit(&self, partitions: &[Partition]) -> Result<Vec<EmittedFile>> {
        let deltas = deltas(partitions);
        let mut pool = if self.threads > 1 && partitions.len() > 1 {
            let mut pool = CompressionPool::new(self.threads.min(partitions.len()), self.level);
            for delta in &deltas {
                pool.submit(to_fastq_bytes(delta));
            }
            Some(pool)
        } else {
            None
        };

        let mut written: Vec<EmittedFile> = Vec::with_capacity(partitions.len());
        for (part, delta) in partitions.iter().zip(&deltas) {
            let member = match pool.as_mut() {
                Some(pool) => pool.next_in_order().unwrap_or_else(|| {
                    Err(io::Error::new(io::ErrorKind::Other, "compression result missing"))
                }),
                None => gzip_member(&to_fastq_bytes(delta), self.level),
            };

            let path = self.output_path(&part.label);
            let result = member.and_then(|m| {
                let previous = written.last().map(|f| f.path.as_path());
                write_snapshot(previous, &path, &m)
            });
            if let Err(source) = result {
                return Err(TimesortError::Emit {
                    label: part.label.clone(),
                    written: written.into_iter().map(|f| f.path).collect(),
                    source,
                });
            }

            info!(
                "wrote {} ({} reads, +{} new){}",
                path.display(),
                part.prefix_len(),
                delta.len(),
                if part.reachable { "" } else { " [threshold not reached]" }
            );
            written.push(EmittedFile {
                label: part.label.clone(),
                path,
                reads: part.prefix_len(),
                reachable: part.reachable,
            });
        }
        Ok(written)
    }
}

/// Reads each partition adds on top of the one before it.
fn deltas<'a>(partitions: &[Partition<'a>]) -> Vec<&'a [Read]> {
    let mut start = 0;
    partitions
        .iter()
        .map(|p| {
            let delta = &p.reads[start.min(p.reads.len())..];
            start = p.reads.len();
            delta
        })
        .collect()
}

fn write_snapshot(previous: Option<&Path>, path: &Path, member: &[u8]) -> io::Result<()> {
    match previous {
        Some(prev) => {
            fs::copy(prev, path)?;
            let mut f = OpenOptions::new().append(true).open(path)?;
            f.write_all(member)?;
            f.flush()
        }
        None => fs::write(path, member),
    }
}
