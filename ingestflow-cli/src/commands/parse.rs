//! `ingestflow parse` command handler

use std::io::Write;
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use ingestflow_core::config::IngestflowConfig;
use ingestflow_core::types::{FileInfo, ParseEvent};
use ingestflow_hub::format_duration;
use ingestflow_parser::{ParserDispatcher, check_extension};

use crate::cli::ParseArgs;
use crate::commands::{file_name, spawn_parse};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `parse` command.
///
/// The extension allow-list applies only when the format is detected.
pub async fn execute(
    args: ParseArgs,
    config: &IngestflowConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let filename = file_name(&args.file);
    if args.format.is_none() {
        check_extension(&filename, &config.parser.allowed_extensions)?;
    }

    let dispatcher = ParserDispatcher::new(config.parser.clone());
    let started = Instant::now();
    let (mut events, task) = spawn_parse(&dispatcher, &args.file, args.format).await?;

    let mut sample = Vec::with_capacity(args.limit.min(1024));
    while let Some(event) = events.recv().await {
        if sample.len() < args.limit {
            sample.push(event);
        }
    }
    let file_info = task.join().await?;

    info!(
        file = %args.file.display(),
        format = %file_info.file_type,
        events = file_info.line_count,
        "parse finished"
    );

    let report = ParseReport {
        file: filename,
        elapsed: format_duration(started.elapsed()),
        file_info,
        events: sample,
    };
    writer.render(&report)
}

#[derive(Debug, Serialize)]
pub struct ParseReport {
    pub file: String,
    pub elapsed: String,
    pub file_info: FileInfo,
    /// First events in input order, up to `--limit`.
    pub events: Vec<ParseEvent>,
}

impl Render for ParseReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let info = &self.file_info;
        writeln!(
            w,
            "Parsed: {} ({})",
            self.file.bold(),
            info.file_type.as_str().cyan()
        )?;
        writeln!(w, "  Events: {}", info.line_count)?;
        writeln!(w, "  Bytes: {}", info.size)?;
        writeln!(w, "  Elapsed: {}", self.elapsed)?;
        if let Some(headers) = &info.headers {
            writeln!(w, "  Headers: {}", headers.join(", "))?;
        }
        if let Some(pattern) = info
            .metadata
            .as_ref()
            .and_then(|m| m.get("pattern"))
            .and_then(|p| p.as_str())
        {
            writeln!(w, "  Log pattern: {}", pattern)?;
        }

        if self.events.is_empty() {
            return Ok(());
        }
        writeln!(w)?;
        writeln!(w, "First {} event(s):", self.events.len())?;
        for event in &self.events {
            writeln!(w, "  #{:<6} {}", event.index, event.data)?;
        }
        Ok(())
    }
}
