//! Core repository components
//!
//! - `database`: Loose object store for blobs, trees, and commits
//! - `refs`: Reference management (branches and HEAD)
//! - `repository`: Ties the areas together under one base path
//! - `workspace`: Working directory file system operations

pub mod database;
pub mod refs;
pub mod repository;
pub mod workspace;
