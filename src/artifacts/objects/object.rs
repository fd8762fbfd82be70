use crate::artifacts::core::{Result, StoreError};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use sha1::{Digest, Sha1};

/// Encode a typed object into its payload bytes (everything after the header)
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Decode a typed object from its payload bytes
pub trait Unpackable {
    fn deserialize(payload: Bytes) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn to_git_object(&self) -> Result<GitObject> {
        Ok(GitObject::new(self.object_type(), self.serialize()?))
    }
}

/// An untyped object: a kind plus its raw payload
///
/// This is what the store persists and what pack resolution produces. Typed
/// views (`Tree`, `Commit`) are parsed from the payload on demand.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct GitObject {
    kind: ObjectType,
    payload: Bytes,
}

impl GitObject {
    pub fn kind(&self) -> ObjectType {
        self.kind
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// `<kind> <decimal-length>\0<payload>`
    pub fn canonical(&self) -> Vec<u8> {
        let header = format!("{} {}\0", self.kind.as_str(), self.payload.len());
        let mut content = Vec::with_capacity(header.len() + self.payload.len());
        content.extend_from_slice(header.as_bytes());
        content.extend_from_slice(&self.payload);
        content
    }

    pub fn object_id(&self) -> ObjectId {
        let mut hasher = Sha1::new();
        hasher.update(format!("{} {}\0", self.kind.as_str(), self.payload.len()));
        hasher.update(&self.payload);

        let raw = hasher.finalize();
        ObjectId::from_raw(raw.as_slice()).unwrap_or_default()
    }

    /// Split a canonical encoding back into kind and payload
    pub fn parse_canonical(content: Bytes) -> Result<Self> {
        let space = content
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| StoreError::CorruptObject("missing kind separator".to_string()))?;
        let nul = content[space..]
            .iter()
            .position(|&b| b == 0)
            .map(|pos| space + pos)
            .ok_or_else(|| StoreError::CorruptObject("missing size separator".to_string()))?;

        let kind = std::str::from_utf8(&content[..space])
            .map_err(|_| StoreError::CorruptObject("object kind is not UTF-8".to_string()))?;
        let kind = ObjectType::try_from(kind)?;

        let declared_size = std::str::from_utf8(&content[space + 1..nul])
            .ok()
            .and_then(|size| size.parse::<usize>().ok())
            .ok_or_else(|| StoreError::CorruptObject("invalid object size".to_string()))?;

        let payload = content.slice(nul + 1..);
        if payload.len() != declared_size {
            return Err(StoreError::CorruptObject(format!(
                "declared size {declared_size} but payload has {} bytes",
                payload.len()
            )));
        }

        Ok(Self::new(kind, payload))
    }
}
