//! Porcelain commands (user-facing workflows)
//!
//! - `init`: Create an empty repository
//! - `clone`: Fetch a remote repository over smart HTTP and check it out
//! - `checkout`: Working tree materialisation shared by clone

mod checkout;
mod clone;
mod init;
