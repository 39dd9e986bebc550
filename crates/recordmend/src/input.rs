//! Raw file reading and line decoding shared by the sniffer and analyzer.

use std::fs;
use std::path::Path;

use crate::config::TextEncoding;
use crate::error::{RecordmendError, Result};

/// Read a file fully into memory.
pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| RecordmendError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Split raw bytes into physical lines: `\n` terminated, trailing `\r`
/// stripped, the phantom line after a trailing newline dropped.
pub(crate) fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    let mut lines: Vec<&[u8]> = bytes
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Read and decode every physical line of a file under one encoding.
///
/// Any line that fails to decode is reported, lossily rendered, inside a
/// single [`RecordmendError::UndecodableBytes`].
pub(crate) fn read_decoded_lines(path: &Path, encoding: TextEncoding) -> Result<Vec<String>> {
    let bytes = read_file(path)?;
    let mut decoded = Vec::new();
    let mut bad_lines = Vec::new();

    for raw in split_lines(&bytes) {
        match encoding.decode_line(raw) {
            Some(line) => decoded.push(line),
            None => bad_lines.push(String::from_utf8_lossy(raw).into_owned()),
        }
    }

    if !bad_lines.is_empty() {
        return Err(RecordmendError::UndecodableBytes {
            path: path.to_path_buf(),
            lines: bad_lines,
        });
    }
    Ok(decoded)
}
