//! Command implementations, as `impl Repository` blocks
//!
//! - `plumbing`: Low-level object commands (cat-file, hash-object, ls-tree, ...)
//! - `porcelain`: User-facing workflows (init, clone)

pub mod plumbing;
pub mod porcelain;
