use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdKind {
    Bases,
    Coverage,
    Time,
}

impl ThresholdKind {
    /// Short name used in output file names (`cov_010`, `time_0060`).
    pub fn tag(self) -> &'static str {
        match self {
            ThresholdKind::Bases => "bases",
            ThresholdKind::Coverage => "cov",
            ThresholdKind::Time => "time",
        }
    }

    /// Minimum zero-padding of the integer part of labels.
    fn min_width(self) -> usize {
        match self {
            ThresholdKind::Bases => 1,
            ThresholdKind::Coverage => 3,
            ThresholdKind::Time => 4,
        }
    }
}

/// One snapshot point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Threshold {
    Bases(u64),
    Coverage(f64),
    Minutes(u64),
}

impl Threshold {
    pub fn kind(&self) -> ThresholdKind {
        match self {
            Threshold::Bases(_) => ThresholdKind::Bases,
            Threshold::Coverage(_) => ThresholdKind::Coverage,
            Threshold::Minutes(_) => ThresholdKind::Time,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Bases(v) => write!(f, "{v} bases"),
            Threshold::Coverage(v) => write!(f, "{v}x coverage"),
            Threshold::Minutes(v) => write!(f, "{v} min"),
        }
    }
}

/// What the partitioner compares its running metric against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    /// Cumulative base count must reach this many bases.
    Bases(u64),
    /// Time since the first read must reach this many seconds.
    ElapsedSeconds(f64),
}

/// An ascending list of snapshot points in one metric space.
///
/// Build it with the validating constructors (`base_count`, `coverage`,
/// `time`), which reject empty, non-positive and non-ascending lists.
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdSpec {
    BaseCount(Vec<u64>),
    Coverage { values: Vec<f64>, genome_size: u64 },
    Time(Vec<u64>),
}

impl ThresholdSpec {
    pub fn base_count(values: Vec<u64>) -> Result<Self, ConfigError> {
        check_ascending(&values, |v| *v == 0)?;
        Ok(Self::BaseCount(values))
    }

    pub fn coverage(values: Vec<f64>, genome_size: Option<u64>) -> Result<Self, ConfigError> {
        check_ascending(&values, |v| !(v.is_finite() && *v > 0.0))?;
        match genome_size {
            Some(0) => Err(ConfigError::BadGenomeSize("0".to_string())),
            Some(genome_size) => Ok(Self::Coverage { values, genome_size }),
            None => Err(ConfigError::MissingGenomeSize),
        }
    }

    /// `minutes` since the first read.
    pub fn time(minutes: Vec<u64>) -> Result<Self, ConfigError> {
        check_ascending(&minutes, |v| *v == 0)?;
        Ok(Self::Time(minutes))
    }

    pub fn kind(&self) -> ThresholdKind {
        match self {
            Self::BaseCount(_) => ThresholdKind::Bases,
            Self::Coverage { .. } => ThresholdKind::Coverage,
            Self::Time(_) => ThresholdKind::Time,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::BaseCount(v) | Self::Time(v) => v.len(),
            Self::Coverage { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn genome_size(&self) -> Option<u64> {
        match self {
            Self::Coverage { genome_size, .. } => Some(*genome_size),
            _ => None,
        }
    }

    pub fn thresholds(&self) -> Vec<Threshold> {
        match self {
            Self::BaseCount(v) => v.iter().map(|&b| Threshold::Bases(b)).collect(),
            Self::Coverage { values, .. } => values.iter().map(|&c| Threshold::Coverage(c)).collect(),
            Self::Time(v) => v.iter().map(|&m| Threshold::Minutes(m)).collect(),
        }
    }

    /// Thresholds paired with the concrete target the partitioner must reach.
    pub fn targets(&self) -> Vec<(Threshold, Target)> {
        match self {
            Self::BaseCount(v) => v.iter().map(|&b| (Threshold::Bases(b), Target::Bases(b))).collect(),
            Self::Coverage { values, genome_size } => values
                .iter()
                .map(|&c| (Threshold::Coverage(c), Target::Bases(coverage_target(c, *genome_size))))
                .collect(),
            Self::Time(v) => v
                .iter()
                .map(|&m| (Threshold::Minutes(m), Target::ElapsedSeconds(m as f64 * 60.0)))
                .collect(),
        }
    }

    /// File-name labels, padded to a common width so they sort lexically in
    /// threshold order.
    pub fn labels(&self) -> Vec<String> {
        let tag = self.kind().tag();
        match self {
            Self::BaseCount(v) | Self::Time(v) => {
                let width = v
                    .last()
                    .map_or(1, |m| m.to_string().len())
                    .max(self.kind().min_width());
                v.iter().map(|n| format!("{tag}_{n:0width$}")).collect()
            }
            Self::Coverage { values, .. } => {
                let int_width = values
                    .last()
                    .map_or(1, |m| (m.trunc() as u64).to_string().len())
                    .max(ThresholdKind::Coverage.min_width());
                let precision = values.iter().map(|c| fraction_digits(*c)).max().unwrap_or(0);
                let width = if precision == 0 { int_width } else { int_width + 1 + precision };
                values
                    .iter()
                    .map(|c| format!("{tag}_{c:0width$.precision$}"))
                    .collect()
            }
        }
    }
}

/// Bases needed for `coverage` fold of `genome_size`.
///
/// Bases are whole, so reaching `ceil(c * g)` is reaching `c * g`. Products
/// that are whole in decimal but land a hair above in binary (`1.1 * 100`)
/// are snapped back first.
fn coverage_target(coverage: f64, genome_size: u64) -> u64 {
    let bases = coverage * genome_size as f64;
    let rounded = bases.round();
    if (bases - rounded).abs() <= 1e-9 * bases.max(1.0) {
        rounded as u64
    } else {
        bases.ceil() as u64
    }
}

/// Digits after the point in the shortest decimal form of `value`.
fn fraction_digits(value: f64) -> usize {
    value.to_string().split_once('.').map_or(0, |(_, frac)| frac.len())
}

fn check_ascending<T>(values: &[T], non_positive: impl Fn(&T) -> bool) -> Result<(), ConfigError>
where
    T: PartialOrd + fmt::Display,
{
    if values.is_empty() {
        return Err(ConfigError::EmptyThresholds);
    }
    if let Some(bad) = values.iter().find(|v| non_positive(*v)) {
        return Err(ConfigError::NonPositiveThreshold { value: bad.to_string() });
    }
    for pair in values.windows(2) {
        if !(pair[0] < pair[1]) {
            return Err(ConfigError::NotAscending {
                previous: pair[0].to_string(),
                value: pair[1].to_string(),
            });
        }
    }
    Ok(())
}
