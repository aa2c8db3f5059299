//! ingestflow CLI -- detect, parse and watch uploaded data files
//!
//! Reports go to stdout in the format chosen with `--output`; logs go to stderr.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Commands};
use error::CliError;
use ingestflow_core::config::GeneralConfig;
use output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    // 설정 로드 순서: 기본값 -> 파일 -> 환경변수 -> CLI 플래그
    let config_path = commands::resolve_config_path(cli.config.as_deref()).await;
    let source = commands::config_source(config_path.as_deref());
    let loaded = commands::load_config(config_path.as_deref())
        .await
        .map(|mut loaded| {
            if let Some(level) = &cli.log_level {
                loaded.config.general.log_level = level.clone();
            }
            loaded
        })
        .map_err(|e| (source, e));

    let mut general = loaded
        .as_ref()
        .map(|l| l.config.general.clone())
        .unwrap_or_else(|_| GeneralConfig::default());
    if let Some(level) = &cli.log_level {
        general.log_level = level.clone();
    }
    logging::init_tracing(&general).map_err(|e| CliError::Config(e.to_string()))?;
    // 레코더가 설치되지 않았다면 no-op
    ingestflow_core::metrics::describe_all();

    match cli.command {
        Commands::Config(args) => commands::config::execute(args, loaded, &writer),
        Commands::Detect(args) => {
            commands::detect::execute(args, &require(loaded)?.config, &writer).await
        }
        Commands::Parse(args) => {
            commands::parse::execute(args, &require(loaded)?.config, &writer).await
        }
        Commands::Watch(args) => commands::watch::execute(args, &require(loaded)?.config).await,
    }
}

/// Commands other than `config` cannot run without a valid configuration.
fn require(
    loaded: Result<commands::LoadedConfig, (String, CliError)>,
) -> Result<commands::LoadedConfig, CliError> {
    let loaded = loaded.map_err(|(_, e)| e)?;
    tracing::debug!(source = %loaded.source, "configuration loaded");
    Ok(loaded)
}
