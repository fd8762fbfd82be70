use crate::artifacts::objects::entry_mode::{EntryMode, FileMode};
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 1] = [".git"];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    /// Direct children of `dir_path` (the root when `None`), relative to the
    /// workspace and sorted by name
    pub fn list_dir(&self, dir_path: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
        let dir_path = match dir_path {
            Some(p) => self.path.join(p),
            None => self.path.to_path_buf(),
        };

        if !dir_path.is_dir() {
            anyhow::bail!("The specified path is not a directory: {:?}", dir_path);
        }

        WalkDir::new(&dir_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry.path()))
            .map(|entry| {
                let entry = entry.with_context(|| format!("Failed to list {dir_path:?}"))?;
                Ok(entry.path().strip_prefix(&self.path)?.to_path_buf())
            })
            .collect()
    }

    fn is_ignored(path: &Path) -> bool {
        path.file_name()
            .map(|name| IGNORED_PATHS.contains(&name.to_string_lossy().as_ref()))
            .unwrap_or(false)
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let file_path = self.path.join(file_path);

        let content = std::fs::read(&file_path)
            .with_context(|| format!("Failed to read file: {file_path:?}"))?;

        Ok(content.into())
    }

    /// Symlink target as stored in a blob
    pub fn read_link(&self, link_path: &Path) -> anyhow::Result<Bytes> {
        let link_path = self.path.join(link_path);

        let target = std::fs::read_link(&link_path)
            .with_context(|| format!("Failed to read symlink: {link_path:?}"))?;

        Ok(Bytes::from(target.to_string_lossy().into_owned()))
    }

    /// Tree mode for a path, without following symlinks
    pub fn entry_mode(&self, path: &Path) -> anyhow::Result<EntryMode> {
        let full_path = self.path.join(path);
        let metadata = std::fs::symlink_metadata(&full_path)
            .with_context(|| format!("Failed to get metadata for: {full_path:?}"))?;

        Ok(if metadata.file_type().is_symlink() {
            EntryMode::Symlink
        } else if metadata.is_dir() {
            EntryMode::Directory
        } else if is_executable::is_executable(&full_path) {
            EntryMode::File(FileMode::Executable)
        } else {
            EntryMode::File(FileMode::Regular)
        })
    }

    /// Refuse paths that pass through, or end at, a symlink inside the workspace
    fn ensure_no_symlinks(&self, relative_path: &Path) -> anyhow::Result<()> {
        let mut current = self.path.to_path_buf();

        for component in relative_path.components() {
            current.push(component);
            match std::fs::symlink_metadata(&current) {
                Ok(metadata) if metadata.file_type().is_symlink() => {
                    anyhow::bail!("refusing to write through symlink {current:?}")
                }
                Ok(_) => continue,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => break,
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to get metadata for: {current:?}"));
                }
            }
        }

        Ok(())
    }

    pub fn write_file(&self, file_path: &Path, data: &[u8], mode: FileMode) -> anyhow::Result<()> {
        self.ensure_no_symlinks(file_path)?;

        let path = self.path.join(file_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to open file: {file_path:?}"))?;

        file.write_all(data)
            .with_context(|| format!("Failed to write to file: {file_path:?}"))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(mode.permissions());
            std::fs::set_permissions(&path, permissions)
                .with_context(|| format!("Failed to set permissions for file: {file_path:?}"))?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(())
    }

    pub fn make_directory(&self, dir_path: &Path) -> anyhow::Result<()> {
        self.ensure_no_symlinks(dir_path)?;

        let dir_path = self.path.join(dir_path);

        if dir_path.is_file() {
            std::fs::remove_file(&dir_path)?;
        }
        std::fs::create_dir_all(&dir_path)
            .with_context(|| format!("Failed to create directory: {dir_path:?}"))?;

        Ok(())
    }

    #[cfg(unix)]
    pub fn create_symlink(&self, link_path: &Path, target: &[u8]) -> anyhow::Result<()> {
        use std::os::unix::ffi::OsStrExt;

        if let Some(parent) = link_path.parent() {
            self.ensure_no_symlinks(parent)?;
        }

        let path = self.path.join(link_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if std::fs::symlink_metadata(&path).is_ok() {
            std::fs::remove_file(&path)?;
        }

        std::os::unix::fs::symlink(std::ffi::OsStr::from_bytes(target), &path)
            .with_context(|| format!("Failed to create symlink: {link_path:?}"))
    }

    /// Without symlink support the target is checked out as a plain file
    #[cfg(not(unix))]
    pub fn create_symlink(&self, link_path: &Path, target: &[u8]) -> anyhow::Result<()> {
        self.write_file(link_path, target, FileMode::Regular)
    }
}
