use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use anyhow::Context;
use bytes::Bytes;
use std::path::Path;

impl Repository {
    /// Snapshot the working directory into tree objects and print the root id
    pub fn write_tree(&mut self) -> anyhow::Result<()> {
        let root = match self.store_directory(None)? {
            Some(oid) => oid,
            // an empty workspace still has a (well-known) empty tree
            None => self.database().store(&Tree::new(Vec::new()))?,
        };

        writeln!(self.writer(), "{root}")?;

        Ok(())
    }

    /// Store `dir` and everything below it; `None` when nothing in it is tracked
    fn store_directory(&self, dir: Option<&Path>) -> anyhow::Result<Option<ObjectId>> {
        let mut entries = Vec::new();

        for path in self.workspace().list_dir(dir)? {
            let name = path
                .file_name()
                .map(|name| Bytes::copy_from_slice(name.as_encoded_bytes()))
                .with_context(|| format!("path has no file name: {path:?}"))?;

            let mode = self.workspace().entry_mode(&path)?;
            let oid = match mode {
                EntryMode::Directory => match self.store_directory(Some(&path))? {
                    Some(oid) => oid,
                    None => continue,
                },
                EntryMode::Symlink => {
                    let target = self.workspace().read_link(&path)?;
                    self.database().store(&Blob::new(target))?
                }
                EntryMode::File(_) => {
                    let data = self.workspace().read_file(&path)?;
                    self.database().store(&Blob::new(data))?
                }
                EntryMode::Gitlink => continue,
            };

            entries.push(TreeEntry::new(mode, name, oid));
        }

        if entries.is_empty() {
            return Ok(None);
        }

        Ok(Some(self.database().store(&Tree::new(entries))?))
    }
}
