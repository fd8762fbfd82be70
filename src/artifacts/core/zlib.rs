//! zlib helpers shared by loose objects and packfiles
//!
//! Loose objects hold exactly one zlib stream, while a packfile holds many
//! streams back to back with no length prefix. In both cases the only reliable
//! boundary is the one the decoder reports, so [`inflate`] drives
//! [`flate2::Decompress`] by hand and returns how many input bytes it consumed.

use flate2::{Compression, Decompress, FlushDecompress, Status};
use std::io::{self, Write};

/// Size of the scratch buffer the decoder writes into on each step
const CHUNK_SIZE: usize = 8 * 1024;

/// Result of inflating one zlib stream
#[derive(Debug)]
pub struct Inflated {
    pub data: Vec<u8>,
    /// Number of compressed bytes the stream occupied
    pub consumed: usize,
}

/// Inflate the zlib stream at the start of `input`.
///
/// Bytes after the end of the stream are left untouched. A stream that stops
/// before the decoder reports its end is an error, never a short result.
pub fn inflate(input: &[u8]) -> io::Result<Inflated> {
    let mut decoder = Decompress::new(true);
    let mut data = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];

    loop {
        let in_before = decoder.total_in() as usize;
        let out_before = decoder.total_out() as usize;

        let status = decoder
            .decompress(&input[in_before..], &mut chunk, FlushDecompress::None)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let produced = decoder.total_out() as usize - out_before;
        data.extend_from_slice(&chunk[..produced]);

        match status {
            Status::StreamEnd => {
                return Ok(Inflated {
                    data,
                    consumed: decoder.total_in() as usize,
                });
            }
            Status::Ok | Status::BufError => {
                let consumed = decoder.total_in() as usize - in_before;
                if consumed == 0 && produced == 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "zlib stream ended before its end marker",
                    ));
                }
            }
        }
    }
}

pub fn deflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
