//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use ingestflow_core::types::FileType;

/// ingestflow -- streaming ingestion of uploaded data files.
///
/// Use `ingestflow <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "ingestflow", version, about, long_about = None)]
pub struct Cli {
    /// Path to the ingestflow.toml configuration file.
    ///
    /// When omitted, `./ingestflow.toml` is used if present, otherwise built-in defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the format of a file.
    Detect(DetectArgs),

    /// Parse a file and report the decoded events.
    Parse(ParseArgs),

    /// Parse a file while streaming hub notifications as JSON lines.
    Watch(WatchArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- detect ----

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// File to inspect.
    pub file: PathBuf,
}

// ---- parse ----

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// File to parse.
    pub file: PathBuf,

    /// Skip detection and parse as this format (json, ndjson, csv, log).
    #[arg(short, long, value_parser = parse_file_type)]
    pub format: Option<FileType>,

    /// Maximum number of events to include in the report.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,
}

// ---- watch ----

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// File to parse.
    pub file: PathBuf,

    /// Job identifier attached to every notification (default: random).
    #[arg(long)]
    pub job_id: Option<String>,

    /// Skip detection and parse as this format (json, ndjson, csv, log).
    #[arg(short, long, value_parser = parse_file_type)]
    pub format: Option<FileType>,

    /// Minimum interval between progress notifications, in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub progress_interval_ms: u64,
}

// ---- config ----

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, parser, hub).
        #[arg(long)]
        section: Option<String>,
    },
}

fn parse_file_type(s: &str) -> Result<FileType, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verify_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_detect() {
        let cli = Cli::try_parse_from(["ingestflow", "detect", "upload.csv"]).expect("parse");
        match cli.command {
            Commands::Detect(args) => assert_eq!(args.file, PathBuf::from("upload.csv")),
            _ => panic!("expected Detect command"),
        }
        assert!(cli.config.is_none());
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn test_cli_parse_parse_with_format_and_limit() {
        let cli = Cli::try_parse_from([
            "ingestflow",
            "parse",
            "data.bin",
            "--format",
            "jsonl",
            "-n",
            "3",
        ])
        .expect("parse");
        match cli.command {
            Commands::Parse(args) => {
                assert_eq!(args.format, Some(FileType::Ndjson));
                assert_eq!(args.limit, 3);
            }
            _ => panic!("expected Parse command"),
        }
    }

    #[test]
    fn test_cli_parse_rejects_unknown_format() {
        let result = Cli::try_parse_from(["ingestflow", "parse", "x", "--format", "xml"]);
        assert!(result.is_err(), "xml is not a supported format");
    }

    #[test]
    fn test_cli_parse_watch_defaults() {
        let cli = Cli::try_parse_from(["ingestflow", "watch", "app.log"]).expect("parse");
        match cli.command {
            Commands::Watch(args) => {
                assert!(args.job_id.is_none());
                assert!(args.format.is_none());
                assert_eq!(args.progress_interval_ms, 500);
            }
            _ => panic!("expected Watch command"),
        }
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ingestflow",
            "config",
            "show",
            "--section",
            "hub",
            "--output",
            "json",
            "-c",
            "/etc/ingestflow.toml",
        ])
        .expect("parse");
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/ingestflow.toml")));
        match cli.command {
            Commands::Config(ConfigArgs {
                action: ConfigAction::Show { section },
            }) => assert_eq!(section.as_deref(), Some("hub")),
            _ => panic!("expected Config Show command"),
        }
    }

    #[test]
    fn test_cli_missing_subcommand_fails() {
        assert!(Cli::try_parse_from(["ingestflow"]).is_err());
    }
}
