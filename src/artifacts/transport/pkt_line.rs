//! pkt-line framing
//!
//! Every line starts with four hex digits giving the total length including
//! the prefix itself. Lengths 0, 1 and 2 are control packets carrying no data.

use thiserror::Error;

/// Largest total length a single pkt-line may declare
pub const MAX_PKT_LENGTH: usize = 65520;
const PREFIX_LENGTH: usize = 4;

pub const FLUSH_PKT: &[u8; 4] = b"0000";

#[derive(Error, Debug, PartialEq, Eq)]
#[error("malformed pkt-line at offset {offset}: {reason}")]
pub struct PktLineError {
    pub offset: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PktLine<'a> {
    Flush,
    Delimiter,
    ResponseEnd,
    Data(&'a [u8]),
}

impl<'a> PktLine<'a> {
    /// Data with a single trailing newline removed; control packets are empty
    pub fn text(&self) -> &'a [u8] {
        match *self {
            PktLine::Data(data) => data.strip_suffix(b"\n").unwrap_or(data),
            _ => &[],
        }
    }
}

/// Frame `data` as a single pkt-line
pub fn encode(data: &[u8]) -> Result<Vec<u8>, PktLineError> {
    let length = data.len() + PREFIX_LENGTH;
    if length > MAX_PKT_LENGTH {
        return Err(PktLineError {
            offset: 0,
            reason: format!("{} bytes do not fit in one line", data.len()),
        });
    }

    let mut line = format!("{length:04x}").into_bytes();
    line.extend_from_slice(data);
    Ok(line)
}

/// Sequential pkt-line reader over a response body
pub struct PktLineReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> PktLineReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        PktLineReader {
            buffer,
            position: 0,
        }
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> &'a [u8] {
        &self.buffer[self.position..]
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.buffer.len()
    }

    /// Next line, or `None` once the buffer is exhausted
    pub fn read_line(&mut self) -> Result<Option<PktLine<'a>>, PktLineError> {
        if self.is_empty() {
            return Ok(None);
        }

        let offset = self.position;
        let malformed = |reason: String| PktLineError { offset, reason };

        let prefix = self
            .buffer
            .get(offset..offset + PREFIX_LENGTH)
            .ok_or_else(|| malformed("truncated length prefix".to_string()))?;
        let prefix = std::str::from_utf8(prefix)
            .ok()
            .filter(|p| p.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| malformed(format!("non-hex length prefix {prefix:?}")))?;
        let length = usize::from_str_radix(prefix, 16)
            .map_err(|e| malformed(format!("length prefix {prefix}: {e}")))?;

        let line = match length {
            0 => PktLine::Flush,
            1 => PktLine::Delimiter,
            2 => PktLine::ResponseEnd,
            3 => return Err(malformed("length 3 is reserved".to_string())),
            _ => {
                let data = self
                    .buffer
                    .get(offset + PREFIX_LENGTH..offset + length)
                    .ok_or_else(|| {
                        malformed(format!(
                            "line of {length} bytes runs past the end of the buffer"
                        ))
                    })?;
                self.position = offset + length;
                return Ok(Some(PktLine::Data(data)));
            }
        };

        self.position = offset + PREFIX_LENGTH;
        Ok(Some(line))
    }
}
