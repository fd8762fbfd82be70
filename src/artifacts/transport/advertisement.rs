//! Ref advertisement returned by `info/refs` discovery
//!
//! ```text
//! 001e# service=git-upload-pack\n
//! 0000
//! 003f<id> HEAD\0<capabilities>\n
//! 003f<id> refs/heads/main\n
//! 0000
//! ```

use crate::artifacts::branch::HEADS_PREFIX;
use crate::artifacts::core::{Result, StoreError};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::transport::pkt_line::{PktLine, PktLineReader};
use derive_new::new;

const PEELED_SUFFIX: &str = "^{}";
const SYMREF_CAPABILITY: &str = "symref=";

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct RefAdvertisement {
    pub name: String,
    pub id: ObjectId,
}

impl RefAdvertisement {
    /// Peeled tag lines name the object a tag points at, not a ref
    pub fn is_peeled(&self) -> bool {
        self.name.ends_with(PEELED_SUFFIX)
    }

    pub fn branch_name(&self) -> Option<&str> {
        self.name.strip_prefix(HEADS_PREFIX)
    }
}

/// What the clone will check out
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct SelectedRef {
    /// Branch name without `refs/heads/`; `None` for a detached head
    pub branch: Option<String>,
    pub id: ObjectId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefDiscovery {
    pub refs: Vec<RefAdvertisement>,
    pub capabilities: Vec<String>,
}

impl RefDiscovery {
    pub fn parse(body: &[u8]) -> Result<Self> {
        let mut reader = PktLineReader::new(body);
        let mut discovery = RefDiscovery::default();

        while let Some(line) = reader.read_line().map_err(network_error)? {
            let text = match line {
                PktLine::Data(_) => line.text(),
                _ => continue,
            };

            if text.starts_with(b"# service=") {
                continue;
            }
            if text.starts_with(b"version 2") {
                return Err(StoreError::Network(
                    "server answered with protocol v2, which is not supported".to_string(),
                ));
            }

            discovery.parse_ref_line(text)?;
        }

        Ok(discovery)
    }

    fn parse_ref_line(&mut self, text: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(text)
            .map_err(|_| StoreError::Network("ref advertisement is not UTF-8".to_string()))?;

        let (reference, capabilities) = match text.split_once('\0') {
            Some((reference, capabilities)) => (reference, Some(capabilities)),
            None => (text, None),
        };

        if let Some(capabilities) = capabilities
            && self.capabilities.is_empty()
        {
            self.capabilities = capabilities.split_whitespace().map(String::from).collect();
        }

        let (id, name) = reference.split_once(' ').ok_or_else(|| {
            StoreError::Network(format!("malformed ref advertisement {reference:?}"))
        })?;
        let id = ObjectId::try_parse(id.to_string())
            .map_err(|e| StoreError::Network(format!("advertised ref {name}: {e}")))?;

        self.refs.push(RefAdvertisement::new(name.to_string(), id));
        Ok(())
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    /// Target of a `symref=<name>:<target>` capability
    pub fn symref_target(&self, name: &str) -> Option<&str> {
        self.capabilities.iter().find_map(|capability| {
            let (source, target) = capability.strip_prefix(SYMREF_CAPABILITY)?.split_once(':')?;
            (source == name).then_some(target)
        })
    }

    fn find(&self, name: &str) -> Option<&RefAdvertisement> {
        self.refs.iter().find(|r| r.name == name && !r.is_peeled())
    }

    fn branches(&self) -> impl Iterator<Item = &RefAdvertisement> {
        self.refs
            .iter()
            .filter(|r| !r.is_peeled() && r.branch_name().is_some())
    }

    /// Pick the ref to clone: HEAD, then `main`, then `master`, then any branch
    pub fn select(&self) -> Result<SelectedRef> {
        if let Some(head) = self.find("HEAD") {
            let branch = self
                .symref_target("HEAD")
                .and_then(|target| target.strip_prefix(HEADS_PREFIX))
                .map(String::from)
                .or_else(|| {
                    self.branches()
                        .find(|r| r.id == head.id)
                        .and_then(|r| r.branch_name())
                        .map(String::from)
                });

            return Ok(SelectedRef::new(branch, head.id.clone()));
        }

        ["refs/heads/main", "refs/heads/master"]
            .iter()
            .find_map(|name| self.find(name))
            .or_else(|| self.branches().next())
            .map(|r| SelectedRef::new(r.branch_name().map(String::from), r.id.clone()))
            .ok_or_else(|| StoreError::NotFound("remote advertises no branch to clone".to_string()))
    }
}

fn network_error(error: impl std::fmt::Display) -> StoreError {
    StoreError::Network(format!("ref discovery: {error}"))
}
