//! Command implementations
//!
//! Commands are split in two categories:
//!
//! - `plumbing`: building blocks shared by several commands (writing a commit)
//! - `porcelain`: the user-facing commands (add, commit, checkout, merge, ...)
//!
//! Each command is an `impl Repository` block; the binary only parses
//! arguments and dispatches.

pub mod plumbing;
pub mod porcelain;
