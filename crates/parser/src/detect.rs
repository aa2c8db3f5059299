//! 형식 감지: 파일 이름과 내용 앞부분으로 [`FileType`]을 결정합니다.
//!
//! 순수 경로([`detect_file_type`])는 실패하지 않으며, 인식할 수 없는 내용은
//! [`FileType::Log`]로 분류됩니다.
//!
//! # 감지 순서
//! 1. 확장자 (대소문자 무시): `.json`, `.ndjson`/`.jsonl`, `.csv`, `.log`/`.txt`
//! 2. 앞부분이 `[`로 시작 → JSON 배열
//! 3. 첫 줄이 `{`로 시작 → NDJSON
//! 4. 첫 줄에 `,`가 있고 `{`가 없음 → CSV
//! 5. 그 외 → 로그

use std::io::{self, BufRead, Read, Seek, SeekFrom};

use ingestflow_core::types::FileType;

/// 내용 기반 감지에 사용하는 기본 앞부분 크기 (바이트)
pub const DEFAULT_PREFIX_BYTES: usize = 1024;

const UTF8_BOM: char = '\u{feff}';

/// 확장자만으로 형식을 결정합니다. 인식할 수 없으면 `None`.
pub fn detect_by_extension(filename: &str) -> Option<FileType> {
    let ext = extension_of(filename)?.to_ascii_lowercase();
    match ext.as_str() {
        ".json" => Some(FileType::Json),
        ".ndjson" | ".jsonl" => Some(FileType::Ndjson),
        ".csv" => Some(FileType::Csv),
        ".log" | ".txt" => Some(FileType::Log),
        _ => None,
    }
}

/// 내용 앞부분만으로 형식을 결정합니다.
pub fn detect_by_content(prefix: &[u8]) -> FileType {
    let text = String::from_utf8_lossy(prefix);
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(&*text);

    if text.trim_start().starts_with('[') {
        return FileType::Json;
    }

    let first_line = text.split('\n').next().unwrap_or_default();
    if first_line.trim().starts_with('{') {
        return FileType::Ndjson;
    }
    if first_line.contains(',') && !first_line.contains('{') {
        return FileType::Csv;
    }

    FileType::Log
}

/// 파일 이름과 내용 앞부분으로 형식을 결정합니다.
///
/// 확장자가 인식되면 내용은 보지 않습니다.
pub fn detect_file_type(filename: &str, prefix: &[u8]) -> FileType {
    detect_by_extension(filename).unwrap_or_else(|| detect_by_content(prefix))
}

/// 탐색 가능한 입력에서 앞부분을 읽어 형식을 감지한 뒤 원래 위치로 되돌립니다.
pub fn sniff<R: Read + Seek>(
    filename: &str,
    reader: &mut R,
    prefix_len: usize,
) -> io::Result<FileType> {
    if let Some(file_type) = detect_by_extension(filename) {
        return Ok(file_type);
    }

    let start = reader.stream_position()?;
    let mut prefix = Vec::with_capacity(prefix_len);
    reader.by_ref().take(prefix_len as u64).read_to_end(&mut prefix)?;
    reader.seek(SeekFrom::Start(start))?;

    Ok(detect_by_content(&prefix))
}

/// 버퍼에 이미 채워진 바이트를 소비하지 않고 들여다보며 형식을 감지합니다.
///
/// 탐색할 수 없는 스트림(파이프, 소켓)용입니다. 하위 리더가 짧게 읽으면
/// `prefix_len`보다 적은 바이트로 판단할 수 있습니다.
pub fn peek<R: BufRead + ?Sized>(
    filename: &str,
    reader: &mut R,
    prefix_len: usize,
) -> io::Result<FileType> {
    if let Some(file_type) = detect_by_extension(filename) {
        return Ok(file_type);
    }

    let buf = reader.fill_buf()?;
    let len = buf.len().min(prefix_len);
    Ok(detect_by_content(&buf[..len]))
}

/// 마지막 경로 구성요소의 마지막 `.`부터의 확장자 (점 포함)
pub(crate) fn extension_of(filename: &str) -> Option<&str> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    name.rfind('.').map(|idx| &name[idx..])
}
