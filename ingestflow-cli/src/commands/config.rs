//! `ingestflow config` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use ingestflow_core::config::IngestflowConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::commands::LoadedConfig;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Section names accepted by `config show --section`.
const SECTIONS: [&str; 3] = ["general", "parser", "hub"];

/// Execute the `config` command.
///
/// Takes the load result rather than the config so that `validate` can
/// report a broken file instead of failing before rendering.
pub fn execute(
    args: ConfigArgs,
    loaded: Result<LoadedConfig, (String, CliError)>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(loaded, writer),
        ConfigAction::Show { section } => {
            let loaded = loaded.map_err(|(_, e)| e)?;
            execute_show(&loaded, section.as_deref(), writer)
        }
    }
}

fn execute_validate(
    loaded: Result<LoadedConfig, (String, CliError)>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = match loaded {
        Ok(loaded) => ConfigValidationReport {
            source: loaded.source,
            valid: true,
            errors: Vec::new(),
        },
        Err((source, e)) => ConfigValidationReport {
            source,
            valid: false,
            errors: vec![e.to_string()],
        },
    };
    info!(source = %report.source, valid = report.valid, "configuration validated");

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

fn execute_show(
    loaded: &LoadedConfig,
    section: Option<&str>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = ConfigReport {
        source: loaded.source.clone(),
        section: section.map(str::to_owned),
        config_toml: section_toml(&loaded.config, section)?,
    };
    writer.render(&report)
}

/// Serialize the whole configuration or a single section to TOML.
fn section_toml(config: &IngestflowConfig, section: Option<&str>) -> Result<String, CliError> {
    let rendered = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("parser") => toml::to_string_pretty(&config.parser),
        Some("hub") => toml::to_string_pretty(&config.hub),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };
    rendered.map_err(|e| CliError::Command(format!("failed to serialize configuration: {e}")))
}

/// Effective configuration, rendered as TOML in text mode.
#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Only used for text rendering
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.section {
            Some(section) => writeln!(
                w,
                "Configuration {} (source: {})",
                format!("[{}]", section).bold(),
                self.source
            )?,
            None => writeln!(w, "Configuration (source: {})", self.source.bold())?,
        }
        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;
        Ok(())
    }
}

#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// Empty if valid
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;
        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }
        Ok(())
    }
}
