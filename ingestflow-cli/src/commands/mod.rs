//! Command handlers -- one module per subcommand

pub mod config;
pub mod detect;
pub mod parse;
pub mod watch;

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::debug;

use ingestflow_core::config::IngestflowConfig;
use ingestflow_core::types::{FileType, ParseEvent};
use ingestflow_parser::{ParseTask, ParserDispatcher, validate_file_size};

use crate::error::CliError;

/// Configuration file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "ingestflow.toml";

/// Effective configuration and where it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: IngestflowConfig,
    pub source: String,
}

/// Pick the configuration file: explicit path, then `./ingestflow.toml` if present.
///
/// `None` means built-in defaults.
pub async fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let default = Path::new(DEFAULT_CONFIG_PATH);
    tokio::fs::try_exists(default)
        .await
        .unwrap_or(false)
        .then(|| default.to_path_buf())
}

/// Human-readable origin of the configuration.
pub fn config_source(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_owned())
}

/// Load the configuration from `path`, or from defaults when `None`.
///
/// Environment overrides and validation apply in both cases.
pub async fn load_config(path: Option<&Path>) -> Result<LoadedConfig, CliError> {
    let config = match path {
        Some(path) => IngestflowConfig::load(path).await?,
        None => {
            let mut config = IngestflowConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            config
        }
    };
    Ok(LoadedConfig {
        config,
        source: config_source(path),
    })
}

/// Last path component, used for extension-based detection.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Start parsing `path` on a blocking thread, detecting the format unless one is forced.
pub(crate) async fn spawn_parse(
    dispatcher: &ParserDispatcher,
    path: &Path,
    format: Option<FileType>,
) -> Result<(mpsc::Receiver<ParseEvent>, ParseTask), CliError> {
    match format {
        None => Ok(dispatcher.spawn_file(path).await?),
        Some(file_type) => {
            debug!(path = %path.display(), format = %file_type, "format forced, skipping detection");
            let metadata = tokio::fs::metadata(path).await?;
            validate_file_size(metadata.len(), dispatcher.config().max_file_size)?;
            let file = tokio::fs::File::open(path).await?.into_std().await;
            Ok(dispatcher.spawn_as(file_type, file))
        }
    }
}
