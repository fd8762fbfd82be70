//! Plumbing commands (low-level object operations)
//!
//! ## Commands
//!
//! - `cat-file`: Print an object's content
//! - `hash-object`: Compute a blob id and optionally store it
//! - `ls-tree`: List the entries of a tree
//! - `write-tree`: Snapshot the working directory as trees
//! - `commit-tree`: Create a commit object for a tree

mod cat_file;
mod commit_tree;
mod hash_object;
mod ls_tree;
mod write_tree;
