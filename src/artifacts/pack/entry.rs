//! Packfile object records
//!
//! Each record is a variable-length type+size header, an optional delta base
//! reference, then a zlib stream. The stream has no length prefix: the record
//! ends wherever the decoder reports the end of the stream.

use crate::artifacts::core::zlib;
use crate::artifacts::core::{Result, StoreError};
use crate::artifacts::objects::RAW_OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;

const OBJ_COMMIT: u8 = 1;
const OBJ_TREE: u8 = 2;
const OBJ_BLOB: u8 = 3;
const OBJ_TAG: u8 = 4;
const OBJ_OFS_DELTA: u8 = 6;
const OBJ_REF_DELTA: u8 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Object(ObjectType),
    /// Delta against the record starting at this absolute pack offset
    OfsDelta { base_offset: usize },
    /// Delta against the object with this id
    RefDelta { base: ObjectId },
}

/// One record, decompressed but not yet resolved
#[derive(Debug, Clone)]
pub struct PackEntry {
    /// Offset of the record's first header byte within the pack
    pub offset: usize,
    pub kind: EntryKind,
    pub declared_size: u64,
    /// Object payload, or delta instructions for delta kinds
    pub data: Bytes,
}

/// Sequential reader over the records of a pack
pub struct PackReader<'p> {
    pack: &'p [u8],
    position: usize,
}

impl<'p> PackReader<'p> {
    pub fn new(pack: &'p [u8], position: usize) -> Self {
        PackReader { pack, position }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn read_entry(&mut self) -> Result<PackEntry> {
        let offset = self.position;
        let (type_code, declared_size) = self.read_type_and_size()?;

        let kind = match type_code {
            OBJ_COMMIT => EntryKind::Object(ObjectType::Commit),
            OBJ_TREE => EntryKind::Object(ObjectType::Tree),
            OBJ_BLOB => EntryKind::Object(ObjectType::Blob),
            OBJ_TAG => EntryKind::Object(ObjectType::Tag),
            OBJ_OFS_DELTA => {
                let distance = self.read_base_distance()?;
                let base_offset = offset.checked_sub(distance).ok_or_else(|| {
                    StoreError::CorruptPack(format!(
                        "ofs-delta at {offset} points {distance} bytes before the pack start"
                    ))
                })?;
                EntryKind::OfsDelta { base_offset }
            }
            OBJ_REF_DELTA => {
                let raw = self.take(RAW_OBJECT_ID_LENGTH)?;
                EntryKind::RefDelta {
                    base: ObjectId::from_raw(raw)?,
                }
            }
            other => {
                return Err(StoreError::CorruptPack(format!(
                    "invalid object type {other} at offset {offset}"
                )));
            }
        };

        let inflated = zlib::inflate(&self.pack[self.position..]).map_err(|e| {
            StoreError::CorruptPack(format!("object at offset {offset}: {e}"))
        })?;
        self.position += inflated.consumed;

        if inflated.data.len() as u64 != declared_size {
            return Err(StoreError::CorruptPack(format!(
                "object at offset {offset} declared {declared_size} bytes but inflated to {}",
                inflated.data.len()
            )));
        }

        Ok(PackEntry {
            offset,
            kind,
            declared_size,
            data: inflated.data.into(),
        })
    }

    fn next_byte(&mut self) -> Result<u8> {
        let byte = self.pack.get(self.position).copied().ok_or_else(|| {
            StoreError::CorruptPack(format!("unexpected end of pack at offset {}", self.position))
        })?;
        self.position += 1;
        Ok(byte)
    }

    fn take(&mut self, count: usize) -> Result<&'p [u8]> {
        let end = self.position + count;
        let bytes = self.pack.get(self.position..end).ok_or_else(|| {
            StoreError::CorruptPack(format!("unexpected end of pack at offset {}", self.position))
        })?;
        self.position = end;
        Ok(bytes)
    }

    /// Low 4 bits of the first byte seed the size, bits 4-6 hold the type,
    /// and every following byte adds 7 more size bits while the high bit is set.
    fn read_type_and_size(&mut self) -> Result<(u8, u64)> {
        let mut byte = self.next_byte()?;
        let type_code = (byte >> 4) & 0b111;
        let mut size = (byte & 0x0f) as u64;
        let mut shift = 4u32;

        while byte & 0x80 != 0 {
            byte = self.next_byte()?;
            let bits = ((byte & 0x7f) as u64).checked_shl(shift);
            size |= bits.ok_or_else(|| {
                StoreError::CorruptPack("object size overflows 64 bits".to_string())
            })?;
            shift += 7;
        }

        Ok((type_code, size))
    }

    /// Big-endian base-128 with a +1 bias on every continuation byte
    fn read_base_distance(&mut self) -> Result<usize> {
        let overflow = || StoreError::CorruptPack("ofs-delta offset overflows".to_string());

        let mut byte = self.next_byte()?;
        let mut distance = (byte & 0x7f) as usize;

        while byte & 0x80 != 0 {
            byte = self.next_byte()?;
            distance = distance
                .checked_add(1)
                .and_then(|d| d.checked_mul(128))
                .ok_or_else(overflow)?
                | (byte & 0x7f) as usize;
        }

        Ok(distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(header: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut bytes = header.to_vec();
        bytes.extend(zlib::deflate(payload).unwrap());
        bytes
    }

    #[test]
    fn reads_single_byte_header() {
        // type 3 (blob), size 5
        let pack = record(&[0b0011_0101], b"hello");
        let mut reader = PackReader::new(&pack, 0);

        let entry = reader.read_entry().unwrap();
        assert_eq!(entry.kind, EntryKind::Object(ObjectType::Blob));
        assert_eq!(entry.declared_size, 5);
        assert_eq!(&entry.data[..], b"hello");
        assert_eq!(reader.position(), pack.len());
    }

    #[test]
    fn reads_multi_byte_size() {
        let payload = vec![b'x'; 300];
        // 300 = 0b1_0010_1100: low nibble 0b1100, then 0b10010 = 18
        let pack = record(&[0b1011_1100, 18], &payload);

        let entry = PackReader::new(&pack, 0).read_entry().unwrap();
        assert_eq!(entry.declared_size, 300);
        assert_eq!(entry.data.len(), 300);
    }

    #[test]
    fn record_boundary_comes_from_the_decoder() {
        let mut pack = record(&[0b0011_0011], b"one");
        let second_start = pack.len();
        pack.extend(record(&[0b0011_0011], b"two"));

        let mut reader = PackReader::new(&pack, 0);
        reader.read_entry().unwrap();
        assert_eq!(reader.position(), second_start);

        let second = reader.read_entry().unwrap();
        assert_eq!(second.offset, second_start);
        assert_eq!(&second.data[..], b"two");
    }

    #[test]
    fn decodes_biased_ofs_offset() {
        // [0x81, 0x00] = ((1 + 1) << 7) | 0 = 256
        let mut pack = vec![0u8; 300];
        let offset = pack.len();
        pack.extend(record(&[0b0110_0001, 0x81, 0x00], b"d"));

        let entry = PackReader::new(&pack, offset).read_entry().unwrap();
        assert_eq!(
            entry.kind,
            EntryKind::OfsDelta {
                base_offset: offset - 256
            }
        );
    }

    #[test]
    fn size_mismatch_is_corrupt() {
        let pack = record(&[0b0011_0100], b"hello");
        assert!(matches!(
            PackReader::new(&pack, 0).read_entry(),
            Err(StoreError::CorruptPack(_))
        ));
    }

    #[test]
    fn truncated_header_is_corrupt() {
        assert!(matches!(
            PackReader::new(&[0b1011_0000], 0).read_entry(),
            Err(StoreError::CorruptPack(_))
        ));
    }

    #[test]
    fn reserved_type_is_corrupt() {
        let pack = record(&[0b0101_0001], b"x");
        assert!(matches!(
            PackReader::new(&pack, 0).read_entry(),
            Err(StoreError::CorruptPack(_))
        ));
    }
}
