//! Plumbing commands
//!
//! - `write_commit`: turn the staging area into a commit on top of HEAD

mod write_commit;
