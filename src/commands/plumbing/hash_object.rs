use crate::areas::database::Database;
use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use std::path::Path;

impl Repository {
    pub fn hash_object(&mut self, object_path: &Path, write: bool) -> anyhow::Result<()> {
        let data = std::fs::read(object_path)
            .with_context(|| format!("could not read {}", object_path.display()))?;

        let object_id = if write {
            self.database().store(&Blob::new(data.into()))?
        } else {
            Database::hash(ObjectType::Blob, data.into())
        };

        writeln!(self.writer(), "{object_id}")?;

        Ok(())
    }
}
