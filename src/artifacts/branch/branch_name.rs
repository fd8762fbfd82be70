use crate::artifacts::branch::{HEADS_PREFIX, INVALID_BRANCH_NAME_REGEX};
use crate::artifacts::core::{Result, StoreError};

/// Branch name as it appears under `refs/heads/`
///
/// Names come from remote advertisements, so they are validated before they
/// are ever joined onto a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> Result<Self> {
        if name.is_empty() {
            return Err(StoreError::InvalidArgument(
                "branch name cannot be empty".to_string(),
            ));
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX).map_err(|e| {
            StoreError::InvalidArgument(format!("invalid branch name regex: {e}"))
        })?;

        if re.is_match(&name) {
            Err(StoreError::InvalidArgument(format!(
                "invalid branch name: {name}"
            )))
        } else {
            Ok(Self(name))
        }
    }

    /// Full ref path, e.g. `refs/heads/main`
    pub fn ref_name(&self) -> String {
        format!("{HEADS_PREFIX}{}", self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
