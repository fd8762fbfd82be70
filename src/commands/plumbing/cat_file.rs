use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;

impl Repository {
    /// Pretty-print an object: blobs and commits verbatim, trees one entry per line
    pub fn cat_file(&mut self, revision: &str) -> anyhow::Result<()> {
        let oid = self.resolve_revision(revision)?;
        let object = self
            .database()
            .load(&oid)
            .with_context(|| format!("failed to read object {oid}"))?;

        match object.kind() {
            ObjectType::Tree => {
                let tree = Tree::deserialize(object.into_payload())?;
                write!(self.writer(), "{}", tree.display())?;
            }
            ObjectType::Blob | ObjectType::Commit | ObjectType::Tag => {
                self.writer().write_all(object.payload())?;
            }
        }

        Ok(())
    }
}
