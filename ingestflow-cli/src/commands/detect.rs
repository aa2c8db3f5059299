//! `ingestflow detect` command handler

use std::io::Write;

use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::info;

use ingestflow_core::config::IngestflowConfig;
use ingestflow_core::types::FileType;
use ingestflow_parser::{
    detect_by_content, detect_by_extension, is_allowed_extension, sanitize_filename,
};

use crate::cli::DetectArgs;
use crate::commands::file_name;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `detect` command.
pub async fn execute(
    args: DetectArgs,
    config: &IngestflowConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let filename = file_name(&args.file);
    let file = tokio::fs::File::open(&args.file).await?;
    let size = file.metadata().await?.len();

    let report = match detect_by_extension(&filename) {
        Some(file_type) => build_report(&filename, size, file_type, DetectedBy::Extension, config),
        None => {
            let mut prefix = Vec::with_capacity(config.parser.detect_prefix_bytes);
            file.take(config.parser.detect_prefix_bytes as u64)
                .read_to_end(&mut prefix)
                .await?;
            let file_type = detect_by_content(&prefix);
            build_report(&filename, size, file_type, DetectedBy::Content, config)
        }
    };

    info!(
        file = %args.file.display(),
        format = %report.file_type,
        detected_by = ?report.detected_by,
        "file type detected"
    );
    writer.render(&report)
}

fn build_report(
    filename: &str,
    size: u64,
    file_type: FileType,
    detected_by: DetectedBy,
    config: &IngestflowConfig,
) -> DetectReport {
    DetectReport {
        file: filename.to_owned(),
        sanitized_name: sanitize_filename(filename),
        size,
        file_type,
        detected_by,
        extension_allowed: is_allowed_extension(filename, &config.parser.allowed_extensions),
        within_size_limit: size > 0 && size <= config.parser.max_file_size,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedBy {
    Extension,
    Content,
}

#[derive(Debug, Serialize)]
pub struct DetectReport {
    pub file: String,
    pub sanitized_name: String,
    pub size: u64,
    pub file_type: FileType,
    pub detected_by: DetectedBy,
    pub extension_allowed: bool,
    pub within_size_limit: bool,
}

impl Render for DetectReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let by = match self.detected_by {
            DetectedBy::Extension => "extension",
            DetectedBy::Content => "content",
        };
        writeln!(w, "File: {}", self.file.bold())?;
        if self.sanitized_name != self.file {
            writeln!(w, "  Sanitized name: {}", self.sanitized_name)?;
        }
        writeln!(
            w,
            "  Type: {} (by {})",
            self.file_type.as_str().cyan().bold(),
            by
        )?;
        writeln!(w, "  Size: {} bytes", self.size)?;

        let yes_no = |ok: bool| if ok { "yes".green() } else { "no".red() };
        writeln!(w, "  Extension allowed: {}", yes_no(self.extension_allowed))?;
        writeln!(w, "  Within size limit: {}", yes_no(self.within_size_limit))?;
        Ok(())
    }
}
