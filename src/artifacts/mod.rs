//! Data structures and algorithms behind the areas
//!
//! - `branch`: branch names
//! - `checkout`: checkout planning and the untracked file guard
//! - `core`: shared utilities (pager wrapper)
//! - `index`: staging area encoding
//! - `log`: commit history traversal
//! - `merge`: split point search and three-way resolution
//! - `objects`: blobs, commits and their ids
//! - `status`: working tree classification

pub mod branch;
pub mod checkout;
pub mod core;
pub mod index;
pub mod log;
pub mod merge;
pub mod objects;
pub mod status;
