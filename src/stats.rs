use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::partition::{Partition, SortedReads, Threshold, ThresholdKind};
use crate::timestamp::BasecallerVariant;

/// What one snapshot ended up containing. Time and coverage are both
/// reported whichever metric picked the snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdStats {
    pub label: String,
    pub threshold: Threshold,
    pub reads: usize,
    pub bases: u64,
    /// Seconds from the first read of the run to the last read of the snapshot.
    pub elapsed_seconds: f64,
    pub coverage: Option<f64>,
    /// Value in the threshold's own unit.
    pub achieved: f64,
    pub reachable: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunTotals {
    pub reads: usize,
    pub bases: u64,
    pub elapsed_seconds: f64,
    pub coverage: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: String,
    pub basecaller: BasecallerVariant,
    pub kind: ThresholdKind,
    pub genome_size: Option<u64>,
    pub totals: RunTotals,
    pub thresholds: Vec<ThresholdStats>,
}

impl RunReport {
    pub fn build(
        input: &str,
        basecaller: BasecallerVariant,
        kind: ThresholdKind,
        reads: &SortedReads,
        partitions: &[Partition],
        genome_size: Option<u64>,
    ) -> Self {
        let coverage = |bases: u64| genome_size.map(|g| bases as f64 / g as f64);

        let total_bases = reads.total_bases();
        let totals = RunTotals {
            reads: reads.len(),
            bases: total_bases,
            elapsed_seconds: reads.elapsed_seconds(reads.len()),
            coverage: coverage(total_bases),
        };

        let thresholds = partitions
            .iter()
            .map(|p| {
                let bases = p.bases;
                ThresholdStats {
                    label: p.label.clone(),
                    threshold: p.threshold,
                    reads: p.prefix_len(),
                    bases,
                    elapsed_seconds: reads.elapsed_seconds(p.prefix_len()),
                    coverage: coverage(bases),
                    achieved: p.achieved,
                    reachable: p.reachable,
                }
            })
            .collect();

        Self {
            input: input.to_string(),
            basecaller,
            kind,
            genome_size,
            totals,
            thresholds,
        }
    }

    pub fn unreachable_count(&self) -> usize {
        self.thresholds.iter().filter(|t| !t.reachable).count()
    }
}

/// `H:MM:SS`, rounded to the second. Hours do not wrap at a day.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}

pub fn write_text_report<W: Write>(w: &mut W, report: &RunReport) -> io::Result<()> {
    writeln!(w, "Input file: {}", report.input)?;
    writeln!(w, "Basecaller: {}", report.basecaller)?;
    writeln!(w, "Threshold kind: {}", report.kind.tag())?;
    writeln!(w, "Total reads: {}", report.totals.reads)?;
    writeln!(w, "Total bases in file: {}", report.totals.bases)?;
    writeln!(w, "Total sequencing time: {}", format_duration(report.totals.elapsed_seconds))?;
    if let Some(g) = report.genome_size {
        writeln!(w, "Genome size: {}", g)?;
    }
    if let Some(c) = report.totals.coverage {
        writeln!(w, "Total coverage: {:.2}", c)?;
    }
    let unreachable = report.unreachable_count();
    if unreachable > 0 {
        writeln!(w, "Unreachable thresholds: {}", unreachable)?;
    }

    writeln!(w)?;
    writeln!(w, "threshold\treads\tbases\telapsed\tcoverage\tstatus")?;
    for t in &report.thresholds {
        let coverage = t.coverage.map_or_else(|| "-".to_string(), |c| format!("{:.2}", c));
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            t.label,
            t.reads,
            t.bases,
            format_duration(t.elapsed_seconds),
            coverage,
            if t.reachable { "reached" } else { "unreachable" }
        )?;
    }
    Ok(())
}

pub fn write_text_report_file<P: AsRef<Path>>(path: P, report: &RunReport) -> io::Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    write_text_report(&mut f, report)?;
    f.flush()
}

pub fn write_json_report<P: AsRef<Path>>(path: P, report: &RunReport) -> Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut f, report)?;
    f.flush()?;
    Ok(())
}
