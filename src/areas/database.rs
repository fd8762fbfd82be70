//! Loose object database
//!
//! Every object lives in its own file at `<objects>/<2-hex>/<38-hex>`, holding
//! the zlib-compressed canonical encoding `<kind> <len>\0<payload>`. Because the
//! path is derived from the content, writes are idempotent: an existing file
//! for an id is never rewritten.

use crate::artifacts::core::zlib;
use crate::artifacts::core::{Result, StoreError};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{GitObject, Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use bytes::Bytes;
use fake::rand;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::trace;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Compute the id an object would be stored under, without writing it
    pub fn hash(kind: ObjectType, payload: Bytes) -> ObjectId {
        GitObject::new(kind, payload).object_id()
    }

    /// Persist a payload under its content hash
    pub fn put(&self, kind: ObjectType, payload: Bytes) -> Result<ObjectId> {
        self.store_raw(&GitObject::new(kind, payload))
    }

    /// Persist a typed object
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        self.store_raw(&object.to_git_object()?)
    }

    pub fn store_raw(&self, object: &GitObject) -> Result<ObjectId> {
        let object_id = object.object_id();
        let object_path = self.path.join(object_id.to_path());

        // write the object to disk unless it already exists
        if !object_path.exists() {
            let object_dir = object_path.parent().ok_or_else(|| {
                StoreError::InvalidArgument(format!("invalid object path {}", object_path.display()))
            })?;
            std::fs::create_dir_all(object_dir)?;

            self.write_object(&object_path, &object.canonical())?;
            trace!(oid = %object_id, kind = %object.kind(), "stored object");
        }

        Ok(object_id)
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    /// Read an object back by id
    pub fn load(&self, object_id: &ObjectId) -> Result<GitObject> {
        let object_path = self.path.join(object_id.to_path());
        let content = self.read_object(&object_path, object_id)?;

        GitObject::parse_canonical(content)
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> Result<Option<Tree>> {
        let object = self.load(object_id)?;

        match object.kind() {
            ObjectType::Tree => Ok(Some(Tree::deserialize(object.into_payload())?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> Result<Option<Commit>> {
        let object = self.load(object_id)?;

        match object.kind() {
            ObjectType::Commit => Ok(Some(Commit::deserialize(object.into_payload())?)),
            _ => Ok(None),
        }
    }

    /// Resolve a tree-ish: a tree id as-is, or a commit id to its tree
    pub fn resolve_tree(&self, object_id: &ObjectId) -> Result<Tree> {
        let object = self.load(object_id)?;

        match object.kind() {
            ObjectType::Tree => Tree::deserialize(object.into_payload()),
            ObjectType::Commit => {
                let commit = Commit::deserialize(object.into_payload())?;
                self.parse_object_as_tree(commit.tree_oid())?.ok_or_else(|| {
                    StoreError::CorruptObject(format!(
                        "commit {object_id} points at non-tree {}",
                        commit.tree_oid()
                    ))
                })
            }
            kind => Err(StoreError::InvalidArgument(format!(
                "{object_id} is a {kind}, not a tree"
            ))),
        }
    }

    fn read_object(&self, object_path: &Path, object_id: &ObjectId) -> Result<Bytes> {
        let compressed = match std::fs::read(object_path) {
            Ok(compressed) => compressed,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(format!("object {object_id}")));
            }
            Err(e) => return Err(e.into()),
        };

        let inflated = zlib::inflate(&compressed)
            .map_err(|e| StoreError::CorruptObject(format!("object {object_id}: {e}")))?;

        Ok(inflated.data.into())
    }

    fn write_object(&self, object_path: &Path, content: &[u8]) -> Result<()> {
        let object_dir = object_path.parent().ok_or_else(|| {
            StoreError::InvalidArgument(format!("invalid object path {}", object_path.display()))
        })?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let compressed = zlib::deflate(content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)?;
        let written = file.write_all(&compressed);
        drop(file);

        // rename the temp file to the object file to make it atomic
        let result = written.and_then(|()| std::fs::rename(&temp_object_path, object_path));
        if result.is_err() {
            let _ = std::fs::remove_file(&temp_object_path);
        }

        Ok(result?)
    }

    fn generate_temp_name() -> PathBuf {
        PathBuf::from(format!("tmp-obj-{}", rand::random::<u32>()))
    }
}
