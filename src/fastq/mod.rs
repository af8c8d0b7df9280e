mod header;

pub use self::header::HeaderMetadata;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{Result, TimesortError};
use crate::timestamp::{BasecallerVariant, TimestampError};

/// One raw 4-line FASTQ record, line endings stripped.
#[derive(Debug, Clone)]
pub struct FastqRecord {
    pub name: String,
    pub seq: String,
    pub plus: String,
    pub qual: String,
}

/// A parsed read with its production time.
#[derive(Debug, Clone, PartialEq)]
pub struct Read {
    pub id: String,
    /// Full header line, written back unchanged.
    pub header: String,
    pub metadata: HeaderMetadata,
    pub sequence: String,
    pub quality: String,
    /// Seconds from an arbitrary but run-wide origin.
    pub timestamp: f64,
}

impl Read {
    /// Validate a raw record and pull its timestamp out of the header.
    /// `record` is the 0-based record index, used in error messages.
    pub fn from_record(rec: FastqRecord, record: usize, variant: BasecallerVariant) -> Result<Self> {
        if !rec.name.starts_with('@') {
            return Err(TimesortError::InvalidFastq {
                record,
                msg: format!("header does not start with '@': {}", rec.name),
            });
        }
        if !rec.plus.starts_with('+') {
            return Err(TimesortError::InvalidFastq {
                record,
                msg: "separator line does not start with '+'".to_string(),
            });
        }
        if rec.seq.len() != rec.qual.len() {
            return Err(TimesortError::InvalidFastq {
                record,
                msg: format!(
                    "sequence length {} != quality length {}",
                    rec.seq.len(),
                    rec.qual.len()
                ),
            });
        }

        let (id, metadata) = HeaderMetadata::parse(&rec.name);
        let timestamp = variant.extract(&metadata).map_err(|e| match e {
            TimestampError::Missing => TimesortError::MissingTimestamp {
                record,
                read_id: id.clone(),
                variant,
            },
            TimestampError::Malformed(value) => TimesortError::MalformedTimestamp {
                record,
                read_id: id.clone(),
                value,
            },
        })?;

        Ok(Self {
            id,
            header: rec.name,
            metadata,
            sequence: rec.seq,
            quality: rec.qual,
            timestamp,
        })
    }

    pub fn base_count(&self) -> u64 {
        self.sequence.len() as u64
    }

    /// Append the read as 4 FASTQ lines.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(self.header.as_bytes())?;
        w.write_all(b"\n")?;
        w.write_all(self.sequence.as_bytes())?;
        w.write_all(b"\n+\n")?;
        w.write_all(self.quality.as_bytes())?;
        w.write_all(b"\n")?;
        Ok(())
    }
}

pub struct Reader {
    reader: Box<dyn BufRead>,
    records: usize,
}

impl Reader {
    /// Open a FASTQ file; `-` reads stdin. `.gz` input may hold several
    /// concatenated gzip members.
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let reader: Box<dyn BufRead> = if path == Path::new("-") {
            Box::new(BufReader::new(io::stdin()))
        } else {
            let f = File::open(path)?;
            if path.extension().map_or(false, |ext| ext == "gz") {
                Box::new(BufReader::new(MultiGzDecoder::new(f)))
            } else {
                Box::new(BufReader::new(f))
            }
        };
        Ok(Self::new(reader))
    }

    pub fn new(reader: Box<dyn BufRead>) -> Self {
        Self { reader, records: 0 }
    }

    pub fn next_record(&mut self) -> Result<Option<FastqRecord>> {
        let mut name = String::new();
        // skip blank lines between records and at end of file
        loop {
            if self.read_line(&mut name)? == 0 {
                return Ok(None);
            }
            if !name.trim().is_empty() {
                break;
            }
            name.clear();
        }

        let mut seq = String::new();
        let mut plus = String::new();
        let mut qual = String::new();
        for line in [&mut seq, &mut plus, &mut qual] {
            if self.read_line(line)? == 0 {
                return Err(TimesortError::InvalidFastq {
                    record: self.records,
                    msg: "truncated record".to_string(),
                });
            }
        }

        for line in [&mut name, &mut seq, &mut plus, &mut qual] {
            if line.ends_with('\n') { line.pop(); }
            if line.ends_with('\r') { line.pop(); }
        }

        self.records += 1;
        Ok(Some(FastqRecord { name, seq, plus, qual }))
    }

    fn read_line(&mut self, buf: &mut String) -> Result<usize> {
        self.reader.read_line(buf).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => TimesortError::InvalidFastq {
                record: self.records,
                msg: "line is not valid UTF-8".to_string(),
            },
            _ => TimesortError::Io(e),
        })
    }

    /// Parse every remaining record into a timestamped read, in file order.
    pub fn read_all(&mut self, variant: BasecallerVariant) -> Result<Vec<Read>> {
        let mut reads = Vec::new();
        while let Some(rec) = self.next_record()? {
            reads.push(Read::from_record(rec, reads.len(), variant)?);
        }
        Ok(reads)
    }
}

/// Serialize reads as plain FASTQ text.
pub fn to_fastq_bytes(reads: &[Read]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(reads.iter().map(|r| r.header.len() + 2 * r.sequence.len() + 6).sum());
    for read in reads {
        // writing to a Vec cannot fail
        let _ = read.write_to(&mut buf);
    }
    buf
}
