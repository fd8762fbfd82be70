//! Pack resolution
//!
//! Records are read left to right. Whole objects resolve immediately; deltas
//! resolve as soon as their base is known. Packs give no ordering guarantee
//! (a ref-delta may precede its base), so deltas that cannot resolve yet are
//! deferred and retried in further passes until everything resolves or a pass
//! makes no progress. That bounds the work to one pass per level of delta
//! chain depth.

use crate::areas::database::Database;
use crate::artifacts::core::{Result, StoreError};
use crate::artifacts::objects::object::GitObject;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::pack::HEADER_SIZE;
use crate::artifacts::pack::delta::apply_delta;
use crate::artifacts::pack::entry::{EntryKind, PackEntry, PackReader};
use crate::artifacts::pack::header::PackHeader;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Objects resolved so far, addressable both ways a delta can name its base
#[derive(Default)]
struct Resolved {
    by_offset: HashMap<usize, GitObject>,
    by_id: HashMap<ObjectId, GitObject>,
    order: Vec<GitObject>,
}

impl Resolved {
    fn insert(&mut self, offset: usize, object: GitObject) {
        self.by_offset.insert(offset, object.clone());
        self.by_id.insert(object.object_id(), object.clone());
        self.order.push(object);
    }
}

pub struct PackParser<'d> {
    /// Store consulted for ref-delta bases that are not in the pack itself
    database: Option<&'d Database>,
}

impl Default for PackParser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d> PackParser<'d> {
    pub fn new() -> Self {
        PackParser { database: None }
    }

    pub fn with_database(database: &'d Database) -> Self {
        PackParser {
            database: Some(database),
        }
    }

    /// Decode every object in the pack, in resolution order
    pub fn parse(&self, pack: &[u8]) -> Result<Vec<GitObject>> {
        let header = PackHeader::parse(pack)?;
        debug!(
            version = header.version,
            objects = header.object_count,
            "parsing pack"
        );

        let mut reader = PackReader::new(pack, HEADER_SIZE);
        let mut resolved = Resolved::default();
        let mut pending = Vec::new();

        for _ in 0..header.object_count {
            let entry = reader.read_entry()?;

            match self.try_resolve(&entry, &resolved)? {
                Some(object) => resolved.insert(entry.offset, object),
                None => pending.push(entry),
            }
        }

        let trailer = pack.len() - reader.position();
        trace!(trailer, "finished reading pack records");

        let mut pass = 1;
        while !pending.is_empty() {
            pass += 1;
            let before = pending.len();
            let mut deferred = Vec::with_capacity(before);

            for entry in pending {
                match self.try_resolve(&entry, &resolved)? {
                    Some(object) => resolved.insert(entry.offset, object),
                    None => deferred.push(entry),
                }
            }

            if deferred.len() == before {
                return Err(StoreError::CorruptPack(format!(
                    "{before} delta object(s) reference bases that never resolve"
                )));
            }
            trace!(pass, remaining = deferred.len(), "delta resolution pass");
            pending = deferred;
        }

        debug!(objects = resolved.order.len(), passes = pass, "resolved pack");
        Ok(resolved.order)
    }

    /// Parse the pack and persist every object, returning how many were written
    pub fn unpack_into(&self, pack: &[u8], database: &Database) -> Result<usize> {
        let objects = self.parse(pack)?;

        for object in &objects {
            database.store_raw(object)?;
        }

        Ok(objects.len())
    }

    fn try_resolve(&self, entry: &PackEntry, resolved: &Resolved) -> Result<Option<GitObject>> {
        let base = match &entry.kind {
            EntryKind::Object(kind) => {
                return Ok(Some(GitObject::new(*kind, entry.data.clone())));
            }
            EntryKind::OfsDelta { base_offset } => resolved.by_offset.get(base_offset).cloned(),
            EntryKind::RefDelta { base } => match resolved.by_id.get(base) {
                Some(object) => Some(object.clone()),
                None => self.load_external_base(base)?,
            },
        };

        let Some(base) = base else {
            return Ok(None);
        };

        let target = apply_delta(base.payload(), &entry.data)
            .map_err(|e| StoreError::CorruptPack(format!("delta at offset {}: {e}", entry.offset)))?;

        Ok(Some(GitObject::new(base.kind(), target.into())))
    }

    fn load_external_base(&self, base: &ObjectId) -> Result<Option<GitObject>> {
        match self.database {
            Some(database) if database.contains(base) => Ok(Some(database.load(base)?)),
            _ => Ok(None),
        }
    }
}
