//! Delta instruction streams
//!
//! A delta starts with two little-endian base-128 sizes (source, target)
//! followed by instructions:
//!
//! - `0xxxxxxx` (non-zero): insert the next `x` literal bytes
//! - `1sssoooo`: copy from the base; each set `o` bit means one offset byte
//!   follows (least significant first), each set `s` bit one size byte.
//!   A size of zero stands for `0x10000`.

use crate::artifacts::core::{Result, StoreError};

const DEFAULT_COPY_SIZE: usize = 0x10000;

/// Rebuild a target object from its base and a delta
pub fn apply_delta(base: &[u8], delta: &[u8]) -> Result<Vec<u8>> {
    let mut cursor = DeltaCursor { delta, position: 0 };

    let source_size = cursor.read_size()?;
    if source_size != base.len() {
        return Err(StoreError::CorruptPack(format!(
            "delta expects a {source_size}-byte base, found {} bytes",
            base.len()
        )));
    }
    let target_size = cursor.read_size()?;

    // the declared target size is untrusted
    let mut target = Vec::with_capacity(target_size.min(base.len() + delta.len()));

    while let Some(opcode) = cursor.read_opcode() {
        if opcode & 0x80 != 0 {
            let mut offset = 0usize;
            for i in 0..4 {
                if opcode & (1 << i) != 0 {
                    offset |= (cursor.next_byte()? as usize) << (8 * i);
                }
            }

            let mut size = 0usize;
            for i in 0..3 {
                if opcode & (0x10 << i) != 0 {
                    size |= (cursor.next_byte()? as usize) << (8 * i);
                }
            }
            if size == 0 {
                size = DEFAULT_COPY_SIZE;
            }

            let chunk = offset
                .checked_add(size)
                .and_then(|end| base.get(offset..end))
                .ok_or_else(|| {
                    StoreError::CorruptPack(format!(
                        "delta copies {size} bytes at {offset} from a {}-byte base",
                        base.len()
                    ))
                })?;
            target.extend_from_slice(chunk);
        } else if opcode != 0 {
            target.extend_from_slice(cursor.take(opcode as usize)?);
        } else {
            return Err(StoreError::CorruptPack(
                "reserved delta opcode 0".to_string(),
            ));
        }

        if target.len() > target_size {
            return Err(StoreError::CorruptPack(format!(
                "delta output exceeds its declared {target_size} bytes"
            )));
        }
    }

    if target.len() != target_size {
        return Err(StoreError::CorruptPack(format!(
            "delta produced {} bytes, expected {target_size}",
            target.len()
        )));
    }

    Ok(target)
}

struct DeltaCursor<'d> {
    delta: &'d [u8],
    position: usize,
}

impl<'d> DeltaCursor<'d> {
    fn read_opcode(&mut self) -> Option<u8> {
        let byte = self.delta.get(self.position).copied()?;
        self.position += 1;
        Some(byte)
    }

    fn next_byte(&mut self) -> Result<u8> {
        self.read_opcode()
            .ok_or_else(|| StoreError::CorruptPack("truncated delta instruction".to_string()))
    }

    fn take(&mut self, count: usize) -> Result<&'d [u8]> {
        let end = self.position + count;
        let bytes = self
            .delta
            .get(self.position..end)
            .ok_or_else(|| StoreError::CorruptPack("truncated delta insert".to_string()))?;
        self.position = end;
        Ok(bytes)
    }

    fn read_size(&mut self) -> Result<usize> {
        let mut size = 0usize;
        let mut shift = 0u32;

        loop {
            let byte = self.next_byte()?;
            size |= ((byte & 0x7f) as usize).checked_shl(shift).ok_or_else(|| {
                StoreError::CorruptPack("delta size overflows".to_string())
            })?;
            shift += 7;

            if byte & 0x80 == 0 {
                return Ok(size);
            }
        }
    }
}
