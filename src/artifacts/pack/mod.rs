//! Packfile decoding
//!
//! A packfile bundles many objects into one stream:
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "PACK" (4 bytes)
//!   - Version: 2 or 3 (4 bytes, big-endian)
//!   - Object count (4 bytes, big-endian)
//!
//! Records (variable length), one per object:
//!   - type+size varint, optional delta base, zlib stream
//!
//! Trailer (20 bytes):
//!   - SHA-1 of everything before it (kept opaque here)
//! ```
//!
//! - `header`: the fixed header
//! - `entry`: record headers and stream boundaries
//! - `delta`: copy/insert reconstruction
//! - `parser`: record resolution into whole objects

pub mod delta;
pub mod entry;
pub mod header;
pub mod parser;

/// Magic signature identifying packfiles
pub const SIGNATURE: &[u8; 4] = b"PACK";

/// Size of the pack header in bytes
pub const HEADER_SIZE: usize = 12;

/// Pack versions this parser understands (their record formats are identical)
pub const SUPPORTED_VERSIONS: [u32; 2] = [2, 3];
