use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        self.create_layout()?;

        writeln!(
            self.writer(),
            "Initialized git directory at {}",
            self.path().display()
        )?;

        Ok(())
    }

    /// Create `.git/objects`, `.git/refs/heads` and HEAD
    pub(crate) fn create_layout(&self) -> anyhow::Result<()> {
        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .git/objects directory")?;

        self.refs()
            .init()
            .context("Failed to create initial HEAD reference")?;

        Ok(())
    }
}
