use crate::artifacts::core::{Result, StoreError};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::transport::pkt_line::{FLUSH_PKT, encode};

/// Capabilities requested when the server advertises them
pub const WANTED_CAPABILITIES: [&str; 3] = ["side-band-64k", "ofs-delta", "no-progress"];

pub fn agent() -> String {
    format!("agent=grit/{}", env!("CARGO_PKG_VERSION"))
}

/// Body of a fetch that asks for `wants` and has nothing to offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    wants: Vec<ObjectId>,
    capabilities: Vec<String>,
}

impl UploadRequest {
    /// Request `wants` with every capability we understand that the server offers
    pub fn new(wants: Vec<ObjectId>, server_capabilities: &[String]) -> Self {
        let mut capabilities: Vec<String> = WANTED_CAPABILITIES
            .iter()
            .filter(|wanted| server_capabilities.iter().any(|c| c == *wanted))
            .map(|wanted| wanted.to_string())
            .collect();
        capabilities.push(agent());

        UploadRequest {
            wants,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.wants.is_empty() {
            return Err(StoreError::InvalidArgument(
                "upload request needs at least one want".to_string(),
            ));
        }

        let mut body = Vec::new();
        for (i, want) in self.wants.iter().enumerate() {
            let line = if i == 0 {
                format!("want {want} {}\n", self.capabilities.join(" "))
            } else {
                format!("want {want}\n")
            };
            body.extend(encode(line.as_bytes()).map_err(|e| StoreError::InvalidArgument(e.to_string()))?);
        }
        body.extend(FLUSH_PKT);
        body.extend(encode(b"done\n").map_err(|e| StoreError::InvalidArgument(e.to_string()))?);

        Ok(body)
    }
}
