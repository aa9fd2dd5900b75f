//! Repository areas
//!
//! - `database`: content-addressed store for blobs and commits
//! - `index`: staging area for the next commit
//! - `refs`: HEAD and branch pointers
//! - `repository`: owns every area for the duration of a command
//! - `workspace`: the working tree on disk

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
