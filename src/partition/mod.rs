//! Cumulative prefixes of the sorted reads, one per threshold.
//!
//! Every partition starts at the first read, so snapshot *k* always holds
//! everything snapshot *k-1* held plus whatever arrived in between.

mod sorter;
mod threshold;

pub use self::sorter::SortedReads;
pub use self::threshold::{Target, Threshold, ThresholdKind, ThresholdSpec};

use log::{debug, warn};

use crate::fastq::Read;

/// Running state carried from one threshold to the next.
///
/// `position` reads have been consumed and they hold `bases` bases. The
/// cursor only moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub position: usize,
    pub bases: u64,
}

impl Cursor {
    /// Consume reads until `target` is met or the reads run out.
    /// Returns whether the target was met.
    pub fn advance(&mut self, reads: &SortedReads, target: Target) -> bool {
        loop {
            if self.reached(reads, target) {
                return true;
            }
            let Some(read) = reads.get(self.position) else {
                return false;
            };
            self.bases += read.base_count();
            self.position += 1;
        }
    }

    fn reached(&self, reads: &SortedReads, target: Target) -> bool {
        // an empty prefix is never a snapshot
        if self.position == 0 {
            return false;
        }
        match target {
            Target::Bases(bases) => self.bases >= bases,
            Target::ElapsedSeconds(secs) => reads.elapsed_seconds(self.position) >= secs,
        }
    }
}

/// The reads selected for one threshold.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    pub threshold: Threshold,
    /// File-name label, e.g. `cov_010`.
    pub label: String,
    /// Prefix of the sorted reads.
    pub reads: &'a [Read],
    /// Bases in `reads`.
    pub bases: u64,
    /// Cumulative value reached, in the threshold's own unit
    /// (bases, fold coverage or minutes).
    pub achieved: f64,
    /// False when the reads ran out first; `reads` is then everything.
    pub reachable: bool,
}

impl<'a> Partition<'a> {
    pub fn prefix_len(&self) -> usize {
        self.reads.len()
    }
}

pub struct Partitioner<'a> {
    reads: &'a SortedReads,
}

impl<'a> Partitioner<'a> {
    pub fn new(reads: &'a SortedReads) -> Self {
        Self { reads }
    }

    /// One partition per threshold, in ascending threshold order.
    pub fn partition(&self, spec: &ThresholdSpec) -> Vec<Partition<'a>> {
        let mut cursor = Cursor::default();
        spec.targets()
            .into_iter()
            .zip(spec.labels())
            .map(|((threshold, target), label)| self.next_partition(&mut cursor, threshold, target, label, spec))
            .collect()
    }

    /// Advance `cursor` to the minimal prefix reaching `target`.
    pub fn next_partition(
        &self,
        cursor: &mut Cursor,
        threshold: Threshold,
        target: Target,
        label: String,
        spec: &ThresholdSpec,
    ) -> Partition<'a> {
        let all: &'a SortedReads = self.reads;
        let reachable = cursor.advance(all, target);
        let reads: &'a [Read] = &all[..cursor.position];

        let achieved = match threshold.kind() {
            ThresholdKind::Bases => cursor.bases as f64,
            ThresholdKind::Coverage => {
                cursor.bases as f64 / spec.genome_size().unwrap_or(1).max(1) as f64
            }
            ThresholdKind::Time => all.elapsed_seconds(cursor.position) / 60.0,
        };

        debug!(
            "{}: cursor at {} reads / {} bases",
            threshold, cursor.position, cursor.bases
        );
        if !reachable {
            warn!(
                "{} not reached; the whole run ({} reads) reaches {:.2}",
                threshold,
                reads.len(),
                achieved
            );
        }

        Partition {
            threshold,
            label,
            reads,
            bases: cursor.bases,
            achieved,
            reachable,
        }
    }
}
