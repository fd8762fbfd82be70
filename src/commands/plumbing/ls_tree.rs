use crate::areas::repository::Repository;
use anyhow::Context;

impl Repository {
    /// List a tree's direct entries; a commit lists its root tree
    pub fn ls_tree(&mut self, tree_ish: &str, name_only: bool) -> anyhow::Result<()> {
        let oid = self.resolve_revision(tree_ish)?;
        let tree = self
            .database()
            .resolve_tree(&oid)
            .with_context(|| format!("not a tree object: {tree_ish}"))?;

        if name_only {
            for entry in tree.entries() {
                let mut writer = self.writer();
                writer.write_all(&entry.name)?;
                writer.write_all(b"\n")?;
            }
        } else {
            write!(self.writer(), "{}", tree.display())?;
        }

        Ok(())
    }
}
