use crate::areas::repository::{GIT_DIR, Repository};
use crate::artifacts::core::StoreError;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

impl Repository {
    /// Materialise a tree into the working directory, returning the number
    /// of files written
    pub(crate) fn checkout_tree(&self, tree_oid: &ObjectId, prefix: &Path) -> anyhow::Result<usize> {
        let tree = self
            .database()
            .parse_object_as_tree(tree_oid)?
            .with_context(|| format!("{tree_oid} is not a tree"))?;

        let mut written = 0;
        let mut seen = HashSet::new();
        for entry in tree.entries() {
            let path = checkout_path(prefix, &entry.name)?;
            if !seen.insert(&entry.name[..]) {
                return Err(StoreError::CorruptObject(format!(
                    "tree {tree_oid} has duplicate entry {:?}",
                    entry.display_name()
                ))
                .into());
            }

            match entry.mode {
                EntryMode::Directory => {
                    self.workspace().make_directory(&path)?;
                    written += self.checkout_tree(&entry.oid, &path)?;
                }
                EntryMode::File(mode) => {
                    let data = self.load_blob(&entry.oid)?;
                    self.workspace().write_file(&path, &data, mode)?;
                    written += 1;
                }
                EntryMode::Symlink => {
                    let target = self.load_blob(&entry.oid)?;
                    self.workspace().create_symlink(&path, &target)?;
                    written += 1;
                }
                EntryMode::Gitlink => {
                    warn!(path = %path.display(), commit = %entry.oid, "skipping submodule");
                    self.workspace().make_directory(&path)?;
                }
            }
            trace!(path = %path.display(), mode = %entry.mode, "checked out");
        }

        Ok(written)
    }

    fn load_blob(&self, oid: &ObjectId) -> anyhow::Result<bytes::Bytes> {
        let object = self.database().load(oid)?;
        if object.kind() != ObjectType::Blob {
            return Err(StoreError::CorruptObject(format!(
                "{oid} is a {}, expected a blob",
                object.kind()
            ))
            .into());
        }

        Ok(object.into_payload())
    }
}

/// Join a tree entry name onto `prefix`, refusing names that would leave
/// the working directory or write into the git directory
fn checkout_path(prefix: &Path, name: &[u8]) -> anyhow::Result<PathBuf> {
    let unsafe_name = || {
        StoreError::CorruptObject(format!(
            "unsafe tree entry name {:?}",
            String::from_utf8_lossy(name)
        ))
    };

    if name.is_empty()
        || name == b"."
        || name == b".."
        || name == GIT_DIR.as_bytes()
        || name.contains(&b'/')
        || name.contains(&0)
    {
        return Err(unsafe_name().into());
    }

    #[cfg(unix)]
    let name = <std::ffi::OsStr as std::os::unix::ffi::OsStrExt>::from_bytes(name);
    #[cfg(not(unix))]
    let name = std::str::from_utf8(name).map_err(|_| unsafe_name())?;

    Ok(prefix.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::entry_mode::FileMode;
    use crate::artifacts::objects::tree::{Tree, TreeEntry};
    use assert_fs::TempDir;
    use bytes::Bytes;
    use rstest::rstest;

    #[test]
    fn writes_nested_files_and_modes() {
        let dir = TempDir::new().unwrap();
        let repository = Repository::new(dir.path(), Box::new(std::io::sink())).unwrap();
        repository.create_layout().unwrap();
        let database = repository.database();

        let readme = database.store(&Blob::new(Bytes::from_static(b"# readme\n"))).unwrap();
        let script = database.store(&Blob::new(Bytes::from_static(b"#!/bin/sh\n"))).unwrap();
        let bin = database
            .store(&Tree::new(vec![TreeEntry::new(
                EntryMode::File(FileMode::Executable),
                "run".to_string(),
                script,
            )]))
            .unwrap();
        let root = database
            .store(&Tree::new(vec![
                TreeEntry::new(EntryMode::default(), "README.md".to_string(), readme),
                TreeEntry::new(EntryMode::Directory, "bin".to_string(), bin),
            ]))
            .unwrap();

        let written = repository.checkout_tree(&root, Path::new("")).unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            std::fs::read(dir.path().join("README.md")).unwrap(),
            b"# readme\n"
        );
        #[cfg(unix)]
        assert!(is_executable::is_executable(dir.path().join("bin/run")));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_shadowed_by_directory_cannot_escape() {
        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let repository = Repository::new(dir.path().join("clone"), Box::new(std::io::sink())).unwrap();
        repository.create_layout().unwrap();
        let database = repository.database();

        let target = outside.path().to_string_lossy().into_owned();
        let link = database.store(&Blob::new(Bytes::from(target))).unwrap();
        let payload = database.store(&Blob::new(Bytes::from_static(b"escaped"))).unwrap();
        let inner = database
            .store(&Tree::new(vec![TreeEntry::new(
                EntryMode::default(),
                "pwned".to_string(),
                payload,
            )]))
            .unwrap();
        let root = database
            .store(&Tree::new(vec![
                TreeEntry::new(EntryMode::Symlink, "a".to_string(), link),
                TreeEntry::new(EntryMode::Directory, "a".to_string(), inner),
            ]))
            .unwrap();

        assert!(repository.checkout_tree(&root, Path::new("")).is_err());
        assert!(!outside.path().join("pwned").exists());
    }

    #[rstest]
    #[case("..")]
    #[case(".")]
    #[case(".git")]
    #[case("a/b")]
    #[case("")]
    fn unsafe_names_are_rejected(#[case] name: &str) {
        assert!(checkout_path(Path::new("dir"), name.as_bytes()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_map_to_raw_file_names() {
        use std::os::unix::ffi::OsStrExt;

        let path = checkout_path(Path::new("dir"), b"caf\xe9.txt").unwrap();
        assert_eq!(path.file_name().unwrap().as_bytes(), b"caf\xe9.txt");
    }
}
