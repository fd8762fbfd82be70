use crate::areas::database::Database;
use crate::areas::refs::{HEAD_REF_NAME, Refs};
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::Path;

pub const GIT_DIR: &str = ".git";
pub const OBJECTS_DIR: &str = "objects";

/// A working tree and its `.git` directory, rooted at an explicit path
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(path: impl AsRef<Path>, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("failed to create repository directory {path:?}"))?;
        }
        let path = path.canonicalize()?;

        let git_path = path.join(GIT_DIR);
        let database = Database::new(git_path.join(OBJECTS_DIR).into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(git_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_path(&self) -> Box<Path> {
        self.path.join(GIT_DIR).into_boxed_path()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Resolve a full object id, `HEAD`, or a local branch name
    pub fn resolve_revision(&self, revision: &str) -> anyhow::Result<ObjectId> {
        if let Ok(oid) = ObjectId::try_parse(revision.to_string()) {
            return Ok(oid);
        }

        let resolved = if revision == HEAD_REF_NAME {
            self.refs.read_head()?
        } else {
            let branch = BranchName::try_parse(revision.to_string())?;
            self.refs.read_branch(&branch)?
        };

        resolved.with_context(|| format!("not a valid object name: {revision}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;

    fn repository(dir: &TempDir) -> Repository {
        Repository::new(dir.path().join("repo"), Box::new(std::io::sink())).unwrap()
    }

    #[test]
    fn creates_missing_root_and_lays_out_areas() {
        let dir = TempDir::new().unwrap();
        let repository = repository(&dir);

        assert!(repository.path().is_dir());
        assert!(repository.path().is_absolute());
        assert_eq!(repository.git_path().as_ref(), repository.path().join(".git"));
        assert_eq!(
            repository.database().objects_path(),
            repository.path().join(".git/objects")
        );
    }

    #[test]
    fn resolves_ids_head_and_branches() {
        let dir = TempDir::new().unwrap();
        let repository = repository(&dir);
        repository.refs().init().unwrap();

        let oid = ObjectId::try_parse("a".repeat(40)).unwrap();
        let main = BranchName::try_parse("main".to_string()).unwrap();
        repository.refs().update_branch(&main, &oid).unwrap();

        assert_eq!(repository.resolve_revision(&"A".repeat(40)).unwrap(), oid);
        assert_eq!(repository.resolve_revision("HEAD").unwrap(), oid);
        assert_eq!(repository.resolve_revision("main").unwrap(), oid);
        assert!(repository.resolve_revision("missing").is_err());
    }
}
