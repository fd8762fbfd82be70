//! Core utilities and shared types
//!
//! - `error`: the error taxonomy every component reports through
//! - `zlib`: stream inflation with decoder-reported boundaries

pub mod error;
pub mod zlib;

pub use error::{Result, StoreError};
