use std::ops::Deref;

use crate::fastq::Read;

/// Reads in production order (ascending timestamp, file order among ties).
///
/// The only way to get one is [`SortedReads::from_reads`], so holding a
/// `SortedReads` means the ordering has been established.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedReads {
    reads: Vec<Read>,
}

impl SortedReads {
    /// Stable sort by timestamp. Equal timestamps keep their input order, so
    /// the same input always yields the same output.
    pub fn from_reads(mut reads: Vec<Read>) -> Self {
        reads.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self { reads }
    }

    pub fn first_timestamp(&self) -> Option<f64> {
        self.reads.first().map(|r| r.timestamp)
    }

    /// Seconds between the first read and the last read of the prefix of
    /// length `len`. Zero for an empty prefix.
    pub fn elapsed_seconds(&self, len: usize) -> f64 {
        match (self.reads.first(), len.checked_sub(1).and_then(|i| self.reads.get(i))) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    pub fn total_bases(&self) -> u64 {
        self.reads.iter().map(Read::base_count).sum()
    }

    pub fn into_inner(self) -> Vec<Read> {
        self.reads
    }
}

impl Deref for SortedReads {
    type Target = [Read];

    fn deref(&self) -> &[Read] {
        &self.reads
    }
}
