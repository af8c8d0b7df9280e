//! Per-read production time from basecaller header metadata.
//!
//! Guppy and Albacore both record when a read started, but not in the same
//! place on the header line. The variant is picked once per run and applied
//! to every read.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;

use crate::fastq::HeaderMetadata;

/// Header key Guppy uses for the read start time.
pub const START_TIME_KEY: &str = "start_time";

/// Albacore writes `@id runid=.. read=.. ch=.. start_time=..`, so the time
/// is always the fourth metadata token.
const ALBACORE_TIME_POSITION: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BasecallerVariant {
    #[default]
    Guppy,
    Albacore,
}

impl fmt::Display for BasecallerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasecallerVariant::Guppy => write!(f, "Guppy"),
            BasecallerVariant::Albacore => write!(f, "Albacore"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimestampError {
    Missing,
    Malformed(String),
}

impl BasecallerVariant {
    /// Production time of one read, in seconds.
    pub fn extract(self, meta: &HeaderMetadata) -> Result<f64, TimestampError> {
        let raw = match self {
            BasecallerVariant::Guppy => meta.get(START_TIME_KEY),
            BasecallerVariant::Albacore => meta
                .field_at(ALBACORE_TIME_POSITION)
                .and_then(|token| token.split_once('='))
                .map(|(_, value)| value),
        };
        parse_time_value(raw.ok_or(TimestampError::Missing)?)
    }
}

/// Accepts an ISO-8601 date-time (seconds since the Unix epoch) or a plain
/// number of seconds. Either way the result must be finite and non-negative.
pub fn parse_time_value(raw: &str) -> Result<f64, TimestampError> {
    let malformed = || TimestampError::Malformed(raw.to_string());

    let seconds = if let Ok(secs) = raw.parse::<f64>() {
        secs
    } else if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9
    } else {
        // zone-less stamps are taken as UTC
        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map_err(|_| malformed())?
            .and_utc();
        naive.timestamp() as f64 + f64::from(naive.timestamp_subsec_nanos()) * 1e-9
    };

    if seconds.is_finite() && seconds >= 0.0 {
        Ok(seconds)
    } else {
        Err(malformed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(header: &str) -> HeaderMetadata {
        HeaderMetadata::parse(header).1
    }

    #[test]
    fn test_guppy_reads_start_time_key() {
        let m = meta("@r1 runid=x sampleid=s read=1 ch=7 start_time=1970-01-01T00:01:40Z");
        assert_eq!(BasecallerVariant::Guppy.extract(&m), Ok(100.0));
    }

    #[test]
    fn test_guppy_key_position_does_not_matter() {
        let m = meta("@r1 start_time=12.5 runid=x");
        assert_eq!(BasecallerVariant::Guppy.extract(&m), Ok(12.5));
    }

    #[test]
    fn test_albacore_reads_fourth_token() {
        let m = meta("@r1 runid=x read=1 ch=7 start_time=1970-01-01T00:00:42Z");
        assert_eq!(BasecallerVariant::Albacore.extract(&m), Ok(42.0));

        // positional: a Guppy header has the channel in slot 4
        let m = meta("@r1 runid=x sampleid=s read=1 ch=7 start_time=5");
        assert_eq!(BasecallerVariant::Albacore.extract(&m), Ok(7.0));

        let m = meta("@r1 runid=x read=1 ch=7 flow_cell=FAK1");
        assert_eq!(
            BasecallerVariant::Albacore.extract(&m),
            Err(TimestampError::Malformed("FAK1".to_string()))
        );
    }

    #[test]
    fn test_missing_field() {
        let m = meta("@r1 runid=x read=1");
        assert_eq!(BasecallerVariant::Guppy.extract(&m), Err(TimestampError::Missing));
        assert_eq!(BasecallerVariant::Albacore.extract(&m), Err(TimestampError::Missing));

        let m = meta("@r1 runid=x read=1 ch=7 start_time");
        assert_eq!(BasecallerVariant::Albacore.extract(&m), Err(TimestampError::Missing));
    }

    #[test]
    fn test_malformed_values() {
        for bad in ["", "soon", "-1", "NaN", "inf", "2019-13-01T00:00:00Z", "1960-01-01T00:00:00Z"] {
            assert_eq!(
                parse_time_value(bad),
                Err(TimestampError::Malformed(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_datetime_forms() {
        assert_eq!(parse_time_value("1970-01-01T00:00:01.5Z"), Ok(1.5));
        assert_eq!(parse_time_value("1970-01-01T01:00:00+01:00"), Ok(0.0));
        assert_eq!(parse_time_value("1970-01-01T00:02:00"), Ok(120.0));
        assert_eq!(parse_time_value("0"), Ok(0.0));
    }

    #[test]
    fn test_real_run_spacing() {
        let a = parse_time_value("2017-08-09T11:42:09Z").unwrap();
        let b = parse_time_value("2017-08-10T11:42:10Z").unwrap();
        assert_eq!(b - a, 86_401.0);
    }
}
