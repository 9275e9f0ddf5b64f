//! Command-line interface for speech-ingest
//!
//! Provides argument parsing using clap derive macros.

use crate::pipeline::IngestRequest;
use crate::split::Split;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Ingest a speech corpus into WAV files and a SQLite catalog
#[derive(Parser, Debug)]
#[command(
    name = "speech-ingest",
    version,
    about = "Ingest a speech corpus into WAV files and a SQLite catalog",
    after_help = "Re-running is safe: files and catalog rows that already exist are skipped."
)]
pub struct Cli {
    /// Which splits to ingest (default: all of train, validation, test)
    #[arg(
        long,
        value_name = "SPLIT",
        value_enum,
        num_args = 1..,
        default_values_t = Split::ALL
    )]
    pub splits: Vec<Split>,

    /// Max records per split. Omit to process everything
    #[arg(long, value_name = "N")]
    pub limit: Option<NonZeroUsize>,

    /// Project root that relative paths in the configuration resolve against
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (quiet mode)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose logging (-v: info, -vv: debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn request(&self) -> IngestRequest {
        IngestRequest::new(self.splits.clone(), self.limit)
    }

    /// Log filter implied by `-q` / `-v`; `RUST_LOG` takes precedence.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["speech-ingest"]).unwrap();
        assert_eq!(cli.splits, Split::ALL.to_vec());
        assert!(cli.limit.is_none());
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.config.is_none());
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn test_parse_multiple_split_values() {
        let cli =
            Cli::try_parse_from(["speech-ingest", "--splits", "train", "validation"]).unwrap();
        assert_eq!(cli.splits, vec![Split::Train, Split::Validation]);
    }

    #[test]
    fn test_parse_repeated_split_flags() {
        let cli = Cli::try_parse_from(["speech-ingest", "--splits", "test", "--splits", "train"])
            .unwrap();
        assert_eq!(cli.splits, vec![Split::Test, Split::Train]);
    }

    #[test]
    fn test_unknown_split_is_rejected() {
        let result = Cli::try_parse_from(["speech-ingest", "--splits", "dev"]);
        assert!(result.is_err());
        let result = Cli::try_parse_from(["speech-ingest", "--splits", "train", "Train"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_limit() {
        let cli = Cli::try_parse_from(["speech-ingest", "--limit", "5", "--splits", "train"])
            .unwrap();
        assert_eq!(cli.limit, NonZeroUsize::new(5));
        let request = cli.request();
        assert_eq!(request.splits, vec![Split::Train]);
        assert_eq!(request.limit, NonZeroUsize::new(5));
    }

    #[test]
    fn test_zero_and_negative_limit_rejected() {
        assert!(Cli::try_parse_from(["speech-ingest", "--limit", "0"]).is_err());
        assert!(Cli::try_parse_from(["speech-ingest", "--limit", "-3"]).is_err());
        assert!(Cli::try_parse_from(["speech-ingest", "--limit", "many"]).is_err());
    }

    #[test]
    fn test_verbosity_maps_to_log_filter() {
        let cli = Cli::try_parse_from(["speech-ingest", "-v"]).unwrap();
        assert_eq!(cli.log_filter(), "info");
        let cli = Cli::try_parse_from(["speech-ingest", "-vv"]).unwrap();
        assert_eq!(cli.log_filter(), "debug");
        let cli = Cli::try_parse_from(["speech-ingest", "-q", "-v"]).unwrap();
        assert_eq!(cli.log_filter(), "error");
    }

    #[test]
    fn test_parse_root_and_config() {
        let cli = Cli::try_parse_from([
            "speech-ingest",
            "--root",
            "/srv/corpus",
            "--config",
            "/etc/ingest.toml",
        ])
        .unwrap();
        assert_eq!(cli.root, PathBuf::from("/srv/corpus"));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/ingest.toml")));
    }

    #[test]
    fn test_invalid_flag_returns_error() {
        assert!(Cli::try_parse_from(["speech-ingest", "--bogus"]).is_err());
    }
}
