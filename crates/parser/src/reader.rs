//! 입력 읽기 도우미: 길이 제한 줄 읽기와 바이트 계수

use std::io::{self, BufRead, Read};

use crate::error::ParserError;

/// 물리적 줄 번호를 추적하며 길이 제한을 지키는 줄 단위 리더
///
/// 줄 끝의 `\n`과 `\r\n`은 제거됩니다. 마지막 줄에 개행이 없어도 한 줄로 취급합니다.
/// 길이 제한은 줄 끝 문자를 제외한 내용에만 적용됩니다.
pub(crate) struct LineReader<'a> {
    reader: &'a mut dyn BufRead,
    max_line_length: usize,
    /// 제한을 넘는 줄을 오류 대신 잘라서 반환
    truncate: bool,
    line_no: u64,
    buf: Vec<u8>,
}

impl<'a> LineReader<'a> {
    pub(crate) fn new(reader: &'a mut dyn BufRead, max_line_length: usize) -> Self {
        Self {
            reader,
            max_line_length,
            truncate: false,
            line_no: 0,
            buf: Vec::new(),
        }
    }

    /// 긴 줄을 앞 `max_line_length` 바이트로 잘라내는 리더를 생성합니다.
    ///
    /// 잘린 나머지는 다음 `\n`까지 버려지므로 줄 번호는 그대로 유지됩니다.
    pub(crate) fn truncating(reader: &'a mut dyn BufRead, max_line_length: usize) -> Self {
        Self {
            truncate: true,
            ..Self::new(reader, max_line_length)
        }
    }

    /// 다음 줄을 `(1부터 시작하는 줄 번호, 내용)`으로 반환합니다. 입력 끝이면 `None`.
    pub(crate) fn next_line(&mut self) -> Result<Option<(u64, &[u8])>, ParserError> {
        self.buf.clear();

        // 내용 max 바이트 + `\r\n`
        let limit = self.max_line_length as u64 + 2;
        let n = (&mut *self.reader)
            .take(limit)
            .read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        let terminated = self.buf.last() == Some(&b'\n');
        if terminated {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        if self.buf.len() > self.max_line_length {
            if !self.truncate {
                return Err(ParserError::LineTooLong {
                    line: self.line_no,
                    max: self.max_line_length,
                });
            }
            self.buf.truncate(self.max_line_length);
            if !terminated {
                self.skip_rest_of_line()?;
            }
        }

        Ok(Some((self.line_no, &self.buf)))
    }

    /// 다음 `\n`까지(포함) 버립니다.
    fn skip_rest_of_line(&mut self) -> io::Result<()> {
        loop {
            let (used, done) = {
                let available = self.reader.fill_buf()?;
                if available.is_empty() {
                    return Ok(());
                }
                match available.iter().position(|&b| b == b'\n') {
                    Some(pos) => (pos + 1, true),
                    None => (available.len(), false),
                }
            };
            self.reader.consume(used);
            if done {
                return Ok(());
            }
        }
    }
}

/// 하위 리더에서 읽은 바이트 수를 세는 래퍼
#[derive(Debug)]
pub struct CountingReader<R> {
    inner: R,
    bytes_read: u64,
}

impl<R> CountingReader<R> {
    /// 새 계수 리더를 생성합니다.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes_read: 0,
        }
    }

    /// 지금까지 읽은 바이트 수
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.bytes_read += n as u64;
        Ok(n)
    }
}
