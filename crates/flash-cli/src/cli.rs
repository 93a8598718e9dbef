//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use flash::{LDiversityVariant, Metric};

/// Flash: k-anonymity filter for relational datasets
#[derive(Parser)]
#[command(name = "flash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Anonymize a data file
    Anonymize(AnonymizeArgs),

    /// Show the hierarchy used for an attribute
    Hierarchy {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Attribute to show the hierarchy for
        #[arg(short, long)]
        attribute: String,

        /// Configuration file (JSON) supplying the hierarchy folder and format
        #[arg(long)]
        config: Option<PathBuf>,

        /// Folder containing hierarchy files (overrides the config file)
        #[arg(short = 'H', long)]
        hierarchy_dir: Option<PathBuf>,

        /// Relation name used in hierarchy file names (default: file stem)
        #[arg(long)]
        relation: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show attributes, kinds and roles of a data file
    Inspect {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Comma-separated quasi-identifying attributes (default: all non-sensitive)
        #[arg(short = 'Q', long)]
        quasi_identifiers: Option<String>,

        /// Comma-separated sensitive attributes
        #[arg(short = 'S', long)]
        sensitive: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
pub struct AnonymizeArgs {
    /// Path to the data file (CSV/TSV)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Configuration file (JSON); flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Folder containing hierarchy files
    #[arg(short = 'H', long)]
    pub hierarchy_dir: Option<PathBuf>,

    /// Comma-separated quasi-identifying attributes (default: all non-sensitive)
    #[arg(short = 'Q', long)]
    pub quasi_identifiers: Option<String>,

    /// Comma-separated sensitive attributes
    #[arg(short = 'S', long)]
    pub sensitive: Option<String>,

    /// k for k-anonymity (clamped to 2..=100)
    #[arg(short = 'K', long)]
    pub k: Option<u32>,

    /// Disable k-anonymity
    #[arg(long, conflicts_with = "k")]
    pub no_k: bool,

    /// l for l-diversity (clamped to 2..=100)
    #[arg(short = 'L', long)]
    pub l: Option<u32>,

    /// l-diversity variant: distinct (0) or entropy (1)
    #[arg(short = 'V', long)]
    pub variant: Option<LDiversityVariant>,

    /// t for equal-distance t-closeness (clamped to 0.001..=1.0)
    #[arg(short = 'T', long)]
    pub t: Option<f64>,

    /// Maximum fraction of rows that may be suppressed
    #[arg(short = 'O', long)]
    pub max_outliers: Option<f64>,

    /// Information-loss metric
    #[arg(long)]
    pub metric: Option<Metric>,

    /// Generalization level for an attribute, as NAME=LEVEL (repeatable)
    #[arg(long = "level", value_name = "NAME=LEVEL")]
    pub levels: Vec<String>,

    /// Level for attributes without --level
    #[arg(long, default_value = "0")]
    pub default_level: usize,

    /// Relation name used in hierarchy file names (default: file stem)
    #[arg(long)]
    pub relation: Option<String>,

    /// Input field delimiter (default: auto-detect)
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Output path for anonymized data (default: <file>.anon.<format>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "csv")]
    pub format: OutputFormat,

    /// Write the run report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Save the effective configuration as JSON
    #[arg(long)]
    pub save_config: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use csv, tsv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Parse a `NAME=LEVEL` pair.
pub fn parse_level(pair: &str) -> Result<(String, usize), String> {
    let (name, level) = pair
        .split_once('=')
        .ok_or_else(|| format!("Invalid level '{}': expected NAME=LEVEL", pair))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid level '{}': missing attribute name", pair));
    }
    let level = level
        .trim()
        .parse()
        .map_err(|_| format!("Invalid level '{}': level must be a non-negative integer", pair))?;
    Ok((name.to_string(), level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("zip=2"), Ok(("zip".to_string(), 2)));
        assert_eq!(parse_level(" age = 0 "), Ok(("age".to_string(), 0)));
        assert!(parse_level("zip").is_err());
        assert!(parse_level("=1").is_err());
        assert!(parse_level("zip=-1").is_err());
    }

    #[test]
    fn test_anonymize_flags() {
        let cli = Cli::try_parse_from([
            "flash", "anonymize", "data.csv", "-Q", "age,zip", "-S", "disease", "-K", "5", "-L",
            "3", "-V", "entropy", "-T", "0.2", "-O", "0.1", "--level", "zip=1", "-f", "tsv",
        ])
        .unwrap();

        match cli.command {
            Commands::Anonymize(args) => {
                assert_eq!(args.k, Some(5));
                assert_eq!(args.l, Some(3));
                assert_eq!(args.variant, Some(LDiversityVariant::Entropy));
                assert_eq!(args.t, Some(0.2));
                assert_eq!(args.max_outliers, Some(0.1));
                assert_eq!(args.levels, vec!["zip=1"]);
                assert_eq!(args.format.extension(), "tsv");
            }
            _ => panic!("expected anonymize"),
        }
    }

    #[test]
    fn test_hierarchy_flags() {
        let cli = Cli::try_parse_from([
            "flash", "hierarchy", "data.csv", "-a", "zip", "--config", "flash.json",
        ])
        .unwrap();

        match cli.command {
            Commands::Hierarchy {
                config,
                hierarchy_dir,
                ..
            } => {
                assert_eq!(config, Some(PathBuf::from("flash.json")));
                assert_eq!(hierarchy_dir, None);
            }
            _ => panic!("expected hierarchy"),
        }
    }
}
