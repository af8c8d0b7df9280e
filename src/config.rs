use std::path::{Path, PathBuf};

use clap::{ArgAction, ArgGroup, Parser};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::partition::ThresholdSpec;
use crate::timestamp::BasecallerVariant;

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(
    name = "timesort-rs",
    version = "0.1.0",
    about = "Replay a finished nanopore run as cumulative real-time FASTQ snapshots"
)]
#[command(group(ArgGroup::new("thresholds").required(true).args(["bases", "coverage", "time"])))]
pub struct Cli {
    /// Input FASTQ (.gz or plain, '-' for stdin)
    #[arg(short='i', long="in")]
    pub input: String,
    /// Output directory, created if missing
    #[arg(short='o', long="out_dir")]
    pub out_dir: String,

    // Thresholds (exactly one list)
    /// Cumulative base counts, e.g. 500K,1M,5M
    #[arg(short='b', long="bases", value_delimiter=',')]
    pub bases: Vec<String>,
    /// Fold coverages of the genome, e.g. 1,2,5,10
    #[arg(short='c', long="coverage", value_delimiter=',')]
    pub coverage: Vec<String>,
    /// Minutes since the first read, e.g. 10,30,60
    #[arg(short='t', long="time", value_delimiter=',')]
    pub time: Vec<String>,
    /// Genome size, e.g. 5M (required with --coverage)
    #[arg(short='g', long="genome_size")]
    pub genome_size: Option<String>,

    /// Headers were written by Albacore (default: Guppy)
    #[arg(short='a', long="albacore", action=ArgAction::SetTrue)]
    pub albacore: bool,

    // Output naming and reporting
    /// Output file prefix (default: input name without extensions)
    #[arg(short='p', long="prefix")]
    pub prefix: Option<String>,
    /// Also write the stats report as JSON
    #[arg(short='j', long="json")]
    pub json: Option<String>,

    // Performance tuning
    #[arg(short='z', long="compression", default_value_t=4)]
    pub compression: u32,
    /// Gzip worker threads (0 = all CPUs)
    #[arg(short='w', long="thread", default_value_t=1)]
    pub thread: usize,
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub prefix: String,
    pub thresholds: ThresholdSpec,
    /// Enables coverage columns in the report; always set for coverage runs.
    pub genome_size: Option<u64>,
    pub basecaller: BasecallerVariant,
    pub json: Option<PathBuf>,
    pub compression: u32,
    pub threads: usize,
}

impl TryFrom<&Cli> for RunConfig {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, ConfigError> {
        let genome_size = cli.genome_size.as_deref().map(parse_genome_size).transpose()?;

        let given = [&cli.bases, &cli.coverage, &cli.time]
            .iter()
            .filter(|list| !list.is_empty())
            .count();
        let thresholds = match given {
            0 => return Err(ConfigError::NoThresholds),
            1 => {
                if !cli.bases.is_empty() {
                    ThresholdSpec::base_count(parse_whole_list(&cli.bases, "base count")?)?
                } else if !cli.coverage.is_empty() {
                    let values: Vec<f64> = cli.coverage.iter().map(|s| parse_magnitude(s)).collect::<Result<_, _>>()?;
                    ThresholdSpec::coverage(values, genome_size)?
                } else {
                    ThresholdSpec::time(parse_whole_list(&cli.time, "time in minutes")?)?
                }
            }
            _ => return Err(ConfigError::MultipleThresholds),
        };

        let input = PathBuf::from(&cli.input);
        let prefix = cli.prefix.clone().unwrap_or_else(|| sample_name(&input));
        let threads = if cli.thread == 0 { num_cpus::get() } else { cli.thread };

        Ok(Self {
            input,
            out_dir: PathBuf::from(&cli.out_dir),
            prefix,
            thresholds,
            genome_size,
            basecaller: if cli.albacore { BasecallerVariant::Albacore } else { BasecallerVariant::Guppy },
            json: cli.json.as_ref().map(PathBuf::from),
            compression: cli.compression.min(9),
            threads,
        })
    }
}

/// Parse `5M`, `2.5k`, `1200`: K, M and G multiply by 1e3, 1e6 and 1e9.
pub fn parse_magnitude(input: &str) -> Result<f64, ConfigError> {
    let s = input.trim();
    let (number, multiplier) = match s.chars().last().map(|c| c.to_ascii_uppercase()) {
        Some('K') => (&s[..s.len() - 1], 1e3),
        Some('M') => (&s[..s.len() - 1], 1e6),
        Some('G') => (&s[..s.len() - 1], 1e9),
        _ => (s, 1.0),
    };
    match number.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v * multiplier),
        _ => Err(ConfigError::BadMagnitude(input.to_string())),
    }
}

fn parse_whole(input: &str, what: &'static str) -> Result<u64, ConfigError> {
    let v = parse_magnitude(input)?;
    if v < 0.0 {
        return Err(ConfigError::NonPositiveThreshold { value: input.trim().to_string() });
    }
    // products like 2.3 * 1e6 can land a hair off the integer
    let rounded = v.round();
    if (v - rounded).abs() > 1e-6 || rounded > u64::MAX as f64 {
        return Err(ConfigError::NotWhole { what, input: input.to_string() });
    }
    Ok(rounded as u64)
}

fn parse_whole_list(items: &[String], what: &'static str) -> Result<Vec<u64>, ConfigError> {
    items.iter().map(|s| parse_whole(s, what)).collect()
}

pub fn parse_genome_size(input: &str) -> Result<u64, ConfigError> {
    match parse_whole(input, "genome size") {
        Ok(0) | Err(ConfigError::NonPositiveThreshold { .. }) => Err(ConfigError::BadGenomeSize(input.to_string())),
        other => other,
    }
}

/// File name with FASTQ and compression extensions stripped:
/// `run1.chop.fastq.gz` -> `run1.chop`.
pub fn sample_name(path: &Path) -> String {
    let mut name = path
        .file_name()
        .and_then(|s| s.to_str())
        .filter(|s| *s != "-")
        .unwrap_or("reads")
        .to_string();

    for ext in [".gz", ".fastq", ".fq"] {
        if name.len() > ext.len() && name.to_ascii_lowercase().ends_with(ext) {
            name.truncate(name.len() - ext.len());
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["timesort-rs", "-i", "/data/run7.chop.q8.fastq.gz", "-o", "out"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_magnitude() {
        assert_eq!(parse_magnitude("1200"), Ok(1200.0));
        assert_eq!(parse_magnitude("5k"), Ok(5000.0));
        assert_eq!(parse_magnitude("2.5M"), Ok(2_500_000.0));
        assert_eq!(parse_magnitude(" 3G "), Ok(3e9));
        assert_eq!(parse_magnitude("0.5"), Ok(0.5));
        assert!(parse_magnitude("M").is_err());
        assert!(parse_magnitude("5X").is_err());
        assert!(parse_magnitude("").is_err());
        assert!(parse_magnitude("infM").is_err());
    }

    #[test]
    fn test_whole_values() {
        assert_eq!(parse_whole("2.3M", "x"), Ok(2_300_000));
        assert_eq!(
            parse_whole("1.5", "time in minutes"),
            Err(ConfigError::NotWhole { what: "time in minutes", input: "1.5".into() })
        );
        assert_eq!(parse_genome_size("4.6m"), Ok(4_600_000));
        assert_eq!(parse_genome_size("0"), Err(ConfigError::BadGenomeSize("0".into())));
        assert_eq!(parse_genome_size("-5"), Err(ConfigError::BadGenomeSize("-5".into())));
    }

    #[test]
    fn test_sample_name() {
        assert_eq!(sample_name(Path::new("/x/run7.chop.q8.fastq.gz")), "run7.chop.q8");
        assert_eq!(sample_name(Path::new("reads.FQ")), "reads");
        assert_eq!(sample_name(Path::new("plain.txt")), "plain.txt");
        assert_eq!(sample_name(Path::new("-")), "reads");
    }

    #[test]
    fn test_coverage_config() {
        let config = RunConfig::try_from(&cli(&["-g", "5m", "-c", "1,2,2.5,10"])).unwrap();
        assert_eq!(
            config.thresholds,
            ThresholdSpec::coverage(vec![1.0, 2.0, 2.5, 10.0], Some(5_000_000)).unwrap()
        );
        assert_eq!(config.prefix, "run7.chop.q8");
        assert_eq!(config.basecaller, BasecallerVariant::Guppy);
        assert_eq!(config.threads, 1);
        assert_eq!(config.compression, 4);
    }

    #[test]
    fn test_bases_and_time_config() {
        let config = RunConfig::try_from(&cli(&["-b", "500K,1M", "-a", "-p", "s1"])).unwrap();
        assert_eq!(config.thresholds, ThresholdSpec::base_count(vec![500_000, 1_000_000]).unwrap());
        assert_eq!(config.basecaller, BasecallerVariant::Albacore);
        assert_eq!(config.prefix, "s1");
        assert_eq!(config.genome_size, None);

        let config = RunConfig::try_from(&cli(&["-t", "10,30,60", "-g", "2M", "-w", "0"])).unwrap();
        assert_eq!(config.thresholds, ThresholdSpec::time(vec![10, 30, 60]).unwrap());
        assert_eq!(config.genome_size, Some(2_000_000));
        assert!(config.threads >= 1);
    }

    #[test]
    fn test_config_errors() {
        let err = |args: &[&str]| RunConfig::try_from(&cli(args)).unwrap_err();
        assert_eq!(err(&["-c", "1,2"]), ConfigError::MissingGenomeSize);
        assert_eq!(
            err(&["-t", "30,10"]),
            ConfigError::NotAscending { previous: "30".into(), value: "10".into() }
        );
        assert_eq!(err(&["-b", "0,10"]), ConfigError::NonPositiveThreshold { value: "0".into() });
        assert_eq!(err(&["-b", "1x"]), ConfigError::BadMagnitude("1x".into()));
    }

    #[test]
    fn test_threshold_lists_are_exclusive() {
        let argv = ["timesort-rs", "-i", "in.fq", "-o", "out", "-b", "10", "-t", "5"];
        assert!(Cli::try_parse_from(argv).is_err());
        let argv = ["timesort-rs", "-i", "in.fq", "-o", "out"];
        assert!(Cli::try_parse_from(argv).is_err());

        let mut both = cli(&["-b", "10"]);
        both.time = vec!["5".into()];
        assert_eq!(RunConfig::try_from(&both), Err(ConfigError::MultipleThresholds));
        both.bases.clear();
        both.time.clear();
        assert_eq!(RunConfig::try_from(&both), Err(ConfigError::NoThresholds));
    }
}
