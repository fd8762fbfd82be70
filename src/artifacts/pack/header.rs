use crate::artifacts::core::{Result, StoreError};
use crate::artifacts::pack::{HEADER_SIZE, SIGNATURE, SUPPORTED_VERSIONS};
use byteorder::ByteOrder;
use derive_new::new;

/// The fixed 12-byte header at the start of every packfile
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct PackHeader {
    pub version: u32,
    pub object_count: u32,
}

impl PackHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(StoreError::CorruptPack(format!(
                "pack is {} bytes, shorter than its {HEADER_SIZE}-byte header",
                bytes.len()
            )));
        }

        if &bytes[0..4] != SIGNATURE {
            return Err(StoreError::CorruptPack(
                "missing PACK signature".to_string(),
            ));
        }

        let version = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(StoreError::CorruptPack(format!(
                "unsupported pack version {version}"
            )));
        }
        let object_count = byteorder::NetworkEndian::read_u32(&bytes[8..12]);

        Ok(PackHeader::new(version, object_count))
    }
}
