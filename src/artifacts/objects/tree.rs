//! Git tree object
//!
//! Trees represent directory snapshots. They contain entries for files (blobs)
//! and subdirectories (other trees), along with their names and modes.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! There is no entry-length prefix and no padding: entries are walked by
//! scanning for the space and NUL delimiters. Entries are ordered by name,
//! with directory names compared as if they ended in `/`, which is the order
//! git itself writes and the one every tree id depends on.

use crate::artifacts::core::{Result, StoreError};
use crate::artifacts::objects::RAW_OBJECT_ID_LENGTH;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use std::borrow::Cow;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: EntryMode,
    /// Raw name bytes; git does not require them to be UTF-8
    pub name: Bytes,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: EntryMode, name: impl Into<Bytes>, oid: ObjectId) -> Self {
        TreeEntry {
            mode,
            name: name.into(),
            oid,
        }
    }

    pub fn display_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }

    /// Canonical tree ordering
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        let suffix = |entry: &Self| if entry.is_tree() { &b"/"[..] } else { &b""[..] };

        self.name
            .iter()
            .chain(suffix(self))
            .cmp(other.name.iter().chain(suffix(other)))
    }
}

/// Serialize entries into a tree payload, sorting them first
pub fn encode_tree(entries: &[TreeEntry]) -> Bytes {
    let mut sorted = entries.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| a.canonical_cmp(b));

    let mut payload = Vec::new();
    for entry in sorted {
        payload.extend_from_slice(entry.mode.as_str().as_bytes());
        payload.push(b' ');
        payload.extend_from_slice(&entry.name);
        payload.push(0);
        payload.extend_from_slice(&entry.oid.to_raw());
    }

    payload.into()
}

/// Parse a tree payload into its entries, in stored order
pub fn decode_tree(payload: &[u8]) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let mut rest = payload;

    while !rest.is_empty() {
        let space = rest
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| StoreError::CorruptObject("tree entry missing mode".to_string()))?;
        let mode = std::str::from_utf8(&rest[..space])
            .map_err(|_| StoreError::CorruptObject("tree entry mode is not ASCII".to_string()))?;
        let mode = EntryMode::from_octal_str(mode)?;
        rest = &rest[space + 1..];

        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| StoreError::CorruptObject("tree entry missing name".to_string()))?;
        let name = Bytes::copy_from_slice(&rest[..nul]);
        rest = &rest[nul + 1..];

        if rest.len() < RAW_OBJECT_ID_LENGTH {
            return Err(StoreError::CorruptObject(format!(
                "tree entry {} truncated in object id",
                String::from_utf8_lossy(&name)
            )));
        }
        let (raw_oid, tail) = rest.split_at(RAW_OBJECT_ID_LENGTH);
        let oid = ObjectId::from_raw(raw_oid)?;
        rest = tail;

        entries.push(TreeEntry::new(mode, name, oid));
    }

    Ok(entries)
}

/// Git tree object representing a directory snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a tree, putting the entries in canonical order
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(|a, b| a.canonical_cmp(b));
        Tree { entries }
    }

    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    /// `cat-file -p` rendering: `<mode> <type> <oid>\t<name>` per line
    pub fn display(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                format!(
                    "{:0>6} {} {}\t{}\n",
                    entry.mode.as_str(),
                    entry.mode.object_type(),
                    entry.oid,
                    entry.display_name()
                )
            })
            .collect()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Result<Bytes> {
        Ok(encode_tree(&self.entries))
    }
}

impl Unpackable for Tree {
    fn deserialize(payload: Bytes) -> Result<Self> {
        Ok(Tree {
            entries: decode_tree(&payload)?,
        })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}
