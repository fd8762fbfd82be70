use crate::artifacts::core::{Result, StoreError};
use crate::artifacts::transport::advertisement::RefDiscovery;
use crate::artifacts::transport::negotiation::UploadRequest;
use crate::artifacts::transport::side_band::extract_pack;
use crate::artifacts::transport::UPLOAD_PACK_SERVICE;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use tracing::debug;

const REQUEST_CONTENT_TYPE: &str = "application/x-git-upload-pack-request";
const RESULT_CONTENT_TYPE: &str = "application/x-git-upload-pack-result";

/// Client for the stateless smart-HTTP upload-pack protocol
pub struct SmartHttpTransport {
    client: Client,
    base_url: String,
}

impl SmartHttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("grit/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn info_refs_url(&self) -> String {
        format!("{}/info/refs?service={UPLOAD_PACK_SERVICE}", self.base_url)
    }

    fn upload_pack_url(&self) -> String {
        format!("{}/{UPLOAD_PACK_SERVICE}", self.base_url)
    }

    pub async fn discover_refs(&self) -> Result<RefDiscovery> {
        let url = self.info_refs_url();
        debug!(%url, "discovering refs");

        let response = self.client.get(&url).send().await?;
        let body = expect_ok(response, "ref discovery").await?;

        let discovery = RefDiscovery::parse(&body)?;
        debug!(refs = discovery.refs.len(), "received ref advertisement");
        Ok(discovery)
    }

    pub async fn fetch_pack(&self, request: &UploadRequest) -> Result<Vec<u8>> {
        let url = self.upload_pack_url();
        debug!(%url, "requesting pack");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, REQUEST_CONTENT_TYPE)
            .header(ACCEPT, RESULT_CONTENT_TYPE)
            .body(request.encode()?)
            .send()
            .await?;
        let body = expect_ok(response, "pack retrieval").await?;

        debug!(bytes = body.len(), "received upload-pack response");
        extract_pack(&body)
    }
}

async fn expect_ok(response: Response, stage: &str) -> Result<bytes::Bytes> {
    match response.status() {
        StatusCode::OK => Ok(response.bytes().await?),
        status => Err(StoreError::Network(format!(
            "{stage} failed with status {status}"
        ))),
    }
}
