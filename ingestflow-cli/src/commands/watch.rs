//! `ingestflow watch` command handler
//!
//! Parses a file while a notification hub streams the job's progress,
//! completion or error to stdout as JSON lines.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use ingestflow_core::config::IngestflowConfig;
use ingestflow_core::types::{FileInfo, FileType};
use ingestflow_hub::{
    CompleteData, ErrorData, HubBuilder, HubHandle, JsonLinesTransport, ProgressTracker,
    format_duration,
};
use ingestflow_parser::{
    ParserDispatcher, ParserError, check_extension, count_lines, sniff, validate_file_size,
};

use crate::cli::WatchArgs;
use crate::commands::{file_name, spawn_parse};
use crate::error::CliError;

/// Job kind recorded in the hub registry.
const JOB_KIND: &str = "upload";

/// Execute the `watch` command.
///
/// Returns the parse error (after it was published) so the exit code reflects it.
pub async fn execute(args: WatchArgs, config: &IngestflowConfig) -> Result<(), CliError> {
    let filename = file_name(&args.file);
    if args.format.is_none() {
        check_extension(&filename, &config.parser.allowed_extensions)?;
    }
    let job_id = args
        .job_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let (hub, handle) = HubBuilder::new().config(config.hub.clone()).build();
    let cancel = CancellationToken::new();
    let hub_task = tokio::spawn(hub.run(cancel.clone()));

    handle.register_job(&job_id, JOB_KIND);
    let subscription = handle.subscribe(Some(job_id.clone()));
    let sender = tokio::spawn(
        subscription
            .into_sender(JsonLinesTransport::new(tokio::io::stdout()))
            .run(CancellationToken::new()),
    );

    info!(job_id = %job_id, file = %args.file.display(), "watch started");
    let started = Instant::now();
    let result = stream_job(&args, config, &handle, &job_id).await;

    match &result {
        Ok(file_info) => handle.send_complete(
            &job_id,
            CompleteData {
                total_events: file_info.line_count,
                anomaly_count: 0,
                processing_time: format_duration(started.elapsed()),
                file_info: file_info.clone(),
                anomalies: None,
            },
        ),
        Err(e) => {
            warn!(job_id = %job_id, error = %e, "watch job failed");
            handle.send_error(&job_id, error_data(e));
        }
    }

    // 허브는 종료 전에 제출된 알림을 전달하고 구독 큐를 닫음
    cancel.cancel();
    hub_task
        .await
        .map_err(|e| CliError::Command(format!("hub task failed: {e}")))?;
    let outcome = sender
        .await
        .map_err(|e| CliError::Command(format!("sender task failed: {e}")))?;
    info!(
        job_id = %job_id,
        delivered = outcome.delivered,
        reason = ?outcome.reason,
        "watch finished"
    );

    result.map(|_| ())
}

async fn stream_job(
    args: &WatchArgs,
    config: &IngestflowConfig,
    handle: &HubHandle,
    job_id: &str,
) -> Result<FileInfo, CliError> {
    // 줄 수를 세기 전에 크기부터 거부
    let metadata = tokio::fs::metadata(&args.file).await?;
    validate_file_size(metadata.len(), config.parser.max_file_size)?;

    let total = estimate_total(
        args.file.clone(),
        args.format,
        config.parser.detect_prefix_bytes,
    )
    .await?;

    let dispatcher = ParserDispatcher::new(config.parser.clone());
    let (mut events, task) = spawn_parse(&dispatcher, &args.file, args.format).await?;

    let mut tracker = ProgressTracker::new(total)
        .with_min_interval(Duration::from_millis(args.progress_interval_ms));
    while let Some(event) = events.recv().await {
        if let Some(raw) = event.raw {
            tracker.set_current_line(raw);
        }
        if let Some(progress) = tracker.advance(1) {
            handle.send_progress(job_id, progress);
        }
    }

    Ok(task.join().await?)
}

/// Estimate the number of records for progress reporting.
///
/// JSON arrays are not line-oriented, so their total is unknown (0).
async fn estimate_total(
    path: PathBuf,
    format: Option<FileType>,
    prefix_len: usize,
) -> Result<u64, CliError> {
    tokio::task::spawn_blocking(move || count_records(&path, format, prefix_len))
        .await
        .map_err(|e| CliError::Command(format!("line count task failed: {e}")))?
}

fn count_records(
    path: &Path,
    format: Option<FileType>,
    prefix_len: usize,
) -> Result<u64, CliError> {
    let mut file = std::fs::File::open(path)?;
    let file_type = match format {
        Some(file_type) => file_type,
        None => sniff(&file_name(path), &mut file, prefix_len)?,
    };
    let lines = count_lines(file, usize::MAX)? as u64;

    Ok(match file_type {
        FileType::Json => 0,
        FileType::Csv => lines.saturating_sub(1),
        _ => lines,
    })
}

/// Error notification payload: a stable code plus the human-readable message.
fn error_data(err: &CliError) -> ErrorData {
    let code = match err {
        CliError::Parse(ParserError::FileTooLarge { .. }) => "FILE_TOO_LARGE",
        CliError::Parse(ParserError::EmptyFile) => "EMPTY_FILE",
        CliError::Parse(ParserError::ExtensionNotAllowed(_)) => "UNSUPPORTED_FORMAT",
        CliError::Parse(ParserError::Io(_)) | CliError::Io(_) => "IO_ERROR",
        CliError::Parse(_) => "PARSE_ERROR",
        _ => "INTERNAL_ERROR",
    };
    ErrorData::new(code, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(content.as_bytes()).expect("write");
        (dir, path)
    }

    #[test]
    fn test_count_records_by_format() {
        let (_dir, csv) = write_temp("a.csv", "h1,h2\n1,2\n3,4\n");
        assert_eq!(count_records(&csv, None, 1024).expect("count"), 2);

        let (_dir, json) = write_temp("a.json", "[\n{},\n{}\n]\n");
        assert_eq!(count_records(&json, None, 1024).expect("count"), 0);

        let (_dir, log) = write_temp("a.log", "one\ntwo\nthree");
        assert_eq!(count_records(&log, None, 1024).expect("count"), 3);

        let (_dir, ndjson) = write_temp("a.ndjson", "{}\n\n{}\n\n");
        assert_eq!(count_records(&ndjson, None, 1024).expect("count"), 2);
    }

    #[test]
    fn test_count_records_sniffs_content_without_extension() {
        let (_dir, path) = write_temp("upload", "[{\"a\":1}]");
        assert_eq!(count_records(&path, None, 1024).expect("count"), 0);
        assert_eq!(
            count_records(&path, Some(FileType::Ndjson), 1024).expect("count"),
            1
        );
    }

    #[tokio::test]
    async fn test_oversize_file_is_rejected_before_counting() {
        let (_dir, path) = write_temp("big.log", "one\ntwo\nthree\n");
        let mut config = IngestflowConfig::default();
        config.parser.max_file_size = 4;
        let args = WatchArgs {
            file: path,
            job_id: None,
            format: None,
            progress_interval_ms: 500,
        };
        let (_hub, handle) = HubBuilder::new().build();

        let err = stream_job(&args, &config, &handle, "job")
            .await
            .expect_err("oversize file should fail");
        assert!(matches!(
            err,
            CliError::Parse(ParserError::FileTooLarge { max: 4, .. })
        ));
    }

    #[test]
    fn test_error_data_codes() {
        let data = error_data(&CliError::Parse(ParserError::InvalidLine {
            line: 3,
            reason: "expected value".to_owned(),
        }));
        assert_eq!(data.code, "PARSE_ERROR");
        assert!(data.message.contains("line 3"));

        let data = error_data(&CliError::Parse(ParserError::FileTooLarge {
            size: 10,
            max: 5,
        }));
        assert_eq!(data.code, "FILE_TOO_LARGE");

        let data = error_data(&CliError::Command("boom".to_owned()));
        assert_eq!(data.code, "INTERNAL_ERROR");
    }
}
