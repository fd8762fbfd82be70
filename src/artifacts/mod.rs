//! Git data structures and algorithms
//!
//! - `branch`: Branch name validation
//! - `core`: Shared error type and zlib helpers
//! - `objects`: Git object types (blob, tree, commit) and their codecs
//! - `pack`: Packfile parsing and delta resolution
//! - `transport`: Smart-HTTP discovery and pack retrieval

pub mod branch;
pub mod core;
pub mod objects;
pub mod pack;
pub mod transport;
