//! Upload-pack response demultiplexing
//!
//! With `side-band-64k` every pkt-line after the acknowledgements carries a
//! channel byte: 1 for pack data, 2 for progress text, 3 for a fatal error.
//! Without it the raw pack follows the acknowledgements unframed.

use crate::artifacts::core::{Result, StoreError};
use crate::artifacts::pack::SIGNATURE;
use crate::artifacts::transport::pkt_line::{PktLine, PktLineReader};
use tracing::debug;

const BAND_DATA: u8 = 1;
const BAND_PROGRESS: u8 = 2;
const BAND_ERROR: u8 = 3;

/// Pull the packfile out of an upload-pack response body
pub fn extract_pack(response: &[u8]) -> Result<Vec<u8>> {
    let mut reader = PktLineReader::new(response);
    let mut pack = Vec::new();

    loop {
        if pack.is_empty() && reader.remaining().starts_with(SIGNATURE) {
            pack.extend_from_slice(reader.remaining());
            break;
        }

        let line = reader
            .read_line()
            .map_err(|e| StoreError::CorruptPack(format!("upload-pack response: {e}")))?;

        let data = match line {
            None | Some(PktLine::ResponseEnd) => break,
            Some(PktLine::Flush) | Some(PktLine::Delimiter) => continue,
            Some(PktLine::Data(data)) => data,
        };

        if data.starts_with(b"NAK") || data.starts_with(b"ACK ") {
            continue;
        }
        if let Some(message) = data.strip_prefix(b"ERR ") {
            return Err(StoreError::Network(format!(
                "remote error: {}",
                String::from_utf8_lossy(message).trim_end()
            )));
        }

        match data.split_first() {
            Some((&BAND_DATA, chunk)) => pack.extend_from_slice(chunk),
            Some((&BAND_PROGRESS, text)) => {
                debug!(progress = %String::from_utf8_lossy(text).trim_end(), "remote");
            }
            Some((&BAND_ERROR, text)) => {
                return Err(StoreError::Network(format!(
                    "remote error: {}",
                    String::from_utf8_lossy(text).trim_end()
                )));
            }
            Some((band, _)) => {
                return Err(StoreError::CorruptPack(format!(
                    "unknown side-band channel {band}"
                )));
            }
            None => continue,
        }
    }

    if !pack.starts_with(SIGNATURE) {
        return Err(StoreError::CorruptPack(
            "upload-pack response carries no PACK data".to_string(),
        ));
    }

    Ok(pack)
}
