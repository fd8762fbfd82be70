use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::pack::parser::PackParser;
use crate::artifacts::transport::negotiation::UploadRequest;
use crate::artifacts::transport::smart_http::SmartHttpTransport;
use anyhow::Context;
use std::path::Path;
use tracing::{debug, info};

impl Repository {
    /// Fetch the remote's default branch over smart HTTP and check it out
    ///
    /// Stages run strictly in order and the first failure aborts the clone.
    /// Objects already stored stay behind, but no ref is written until the
    /// pack has been fully stored.
    pub async fn clone_from(&mut self, url: &str) -> anyhow::Result<()> {
        if self.git_path().exists() || !self.workspace().list_dir(None)?.is_empty() {
            anyhow::bail!(
                "destination path '{}' already exists and is not an empty directory",
                self.path().display()
            );
        }

        info!(url, path = %self.path().display(), "cloning");
        self.create_layout()?;

        let transport = SmartHttpTransport::new(url)?;
        let discovery = transport
            .discover_refs()
            .await
            .with_context(|| format!("failed to discover refs at {url}"))?;

        let selected = discovery.select()?;
        debug!(branch = ?selected.branch, id = %selected.id, "selected ref");

        let request = UploadRequest::new(vec![selected.id.clone()], &discovery.capabilities);
        debug!(capabilities = ?request.capabilities(), "negotiated");

        let pack = transport
            .fetch_pack(&request)
            .await
            .with_context(|| format!("failed to fetch pack from {url}"))?;
        info!(bytes = pack.len(), "received pack");

        let stored = PackParser::with_database(self.database())
            .unpack_into(&pack, self.database())
            .context("failed to unpack objects")?;
        info!(objects = stored, "stored objects");

        let commit = self
            .database()
            .parse_object_as_commit(&selected.id)?
            .with_context(|| format!("remote ref {} is not a commit", selected.id))?;

        match selected.branch {
            Some(branch) => {
                let branch = BranchName::try_parse(branch)?;
                self.refs().update_branch(&branch, &selected.id)?;
                self.refs().set_head_branch(&branch)?;
            }
            None => self.refs().set_head_detached(&selected.id)?,
        }

        let files = self.checkout_tree(commit.tree_oid(), Path::new(""))?;
        info!(files, "checked out working tree");

        writeln!(
            self.writer(),
            "Cloned {url} into {}",
            self.path().display()
        )?;

        Ok(())
    }
}
