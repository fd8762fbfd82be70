//! Error taxonomy shared by the store, codecs, pack parser and transport
//!
//! Every component reports the most specific kind it can. None of them retry:
//! a failed operation surfaces to the caller as-is.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Missing object or missing ref
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad compressed stream, malformed tree/commit encoding, size mismatch
    #[error("corrupt object: {0}")]
    CorruptObject(String),

    /// Bad signature, truncated header, unresolved delta base, no pack in a response
    #[error("corrupt pack: {0}")]
    CorruptPack(String),

    /// Non-2xx status or transport-level failure
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        StoreError::Network(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
