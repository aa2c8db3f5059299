//! 업로드 경계 도우미
//!
//! 형식 감지 전에 호출자가 적용하는 검증 유틸리티입니다.
//! 감지기와 파서는 이 검증이 이미 끝났다고 가정합니다.

use std::io::{self, BufRead, BufReader, Read};

use crate::detect::extension_of;
use crate::error::ParserError;

/// 정제된 파일 이름의 최대 길이 (바이트)
pub const MAX_FILENAME_BYTES: usize = 255;

/// 업로드 크기를 검증합니다. 빈 파일과 `max_size` 초과를 거부합니다.
pub fn validate_file_size(size: u64, max_size: u64) -> Result<(), ParserError> {
    if size > max_size {
        return Err(ParserError::FileTooLarge {
            size,
            max: max_size,
        });
    }
    if size == 0 {
        return Err(ParserError::EmptyFile);
    }
    Ok(())
}

/// 경로 구분자와 위험한 문자열을 `_`로 바꾸고 길이를 제한합니다.
///
/// `/`, `\`, `..`, NUL 순서로 치환하며, 255바이트를 넘으면 문자 경계에서 자릅니다.
pub fn sanitize_filename(filename: &str) -> String {
    let mut sanitized = filename.to_owned();
    for dangerous in ["/", "\\", "..", "\0"] {
        sanitized = sanitized.replace(dangerous, "_");
    }

    if sanitized.len() > MAX_FILENAME_BYTES {
        let mut end = MAX_FILENAME_BYTES;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized.truncate(end);
    }
    sanitized
}

/// 확장자가 허용 목록에 있는지 확인합니다 (대소문자 무시).
///
/// `allowed`의 항목은 `.csv`처럼 점을 포함한 소문자여야 합니다.
pub fn is_allowed_extension(filename: &str, allowed: &[String]) -> bool {
    let Some(ext) = extension_of(filename) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    allowed.iter().any(|a| *a == ext)
}

/// 확장자 검증 실패를 에러로 반환합니다.
pub fn check_extension(filename: &str, allowed: &[String]) -> Result<(), ParserError> {
    if is_allowed_extension(filename, allowed) {
        Ok(())
    } else {
        Err(ParserError::ExtensionNotAllowed(
            extension_of(filename).unwrap_or_default().to_owned(),
        ))
    }
}

/// 레코드가 될 줄 수를 셉니다. `max_lines`에 도달하면 더 읽지 않습니다.
///
/// 파서처럼 공백뿐인 줄은 세지 않습니다. 개행으로 끝나지 않는 마지막 줄도 한 줄로 셉니다.
pub fn count_lines<R: Read>(reader: R, max_lines: usize) -> io::Result<usize> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut count = 0;

    while count < max_lines {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if !buf.trim_ascii().is_empty() {
            count += 1;
        }
    }
    Ok(count)
}
