use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use anyhow::Context;

impl Repository {
    pub fn commit_tree(
        &mut self,
        tree: &str,
        parents: &[String],
        message: &str,
    ) -> anyhow::Result<()> {
        let tree_oid = self.resolve_revision(tree)?;
        self.database()
            .parse_object_as_tree(&tree_oid)?
            .with_context(|| format!("{tree_oid} is not a valid tree object"))?;

        let parents = parents
            .iter()
            .map(|parent| {
                let oid = self.resolve_revision(parent)?;
                self.database()
                    .parse_object_as_commit(&oid)?
                    .with_context(|| format!("{oid} is not a valid commit object"))?;
                Ok(oid)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let author = Author::load_from_env("AUTHOR")?;
        let committer = Author::load_from_env("COMMITTER").unwrap_or_else(|_| author.clone());

        let mut message = message.to_string();
        if !message.ends_with('\n') {
            message.push('\n');
        }

        let commit = Commit::new(parents, tree_oid, author, committer, message);
        let commit_id = self.database().store(&commit)?;

        writeln!(self.writer(), "{commit_id}")?;

        Ok(())
    }
}
