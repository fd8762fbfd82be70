//! A small git implementation: loose object store, tree and commit codecs,
//! packfile decoding, and cloning over the smart-HTTP protocol.

pub mod areas;
pub mod artifacts;
pub mod commands;
