//! Porcelain commands (user-facing operations)
//!
//! ## Commands
//!
//! - `init`: create a repository with its root commit
//! - `add`: stage files for commit
//! - `commit`: record the staging area
//! - `rm`: unstage or stage the removal of a file
//! - `log`: first-parent history, every commit, commits by message
//! - `status`: branches, staging area and working tree changes
//! - `checkout`: restore files, switch branches, detach HEAD
//! - `branch`: create and delete branches
//! - `reset`: move the current branch to any commit
//! - `merge`: three-way merge of another branch

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod rm;
pub mod status;
