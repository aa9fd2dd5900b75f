//! Working tree status inspection
//!
//! Every path known to the head commit, the staging area or the working tree
//! is classified by comparing the three.
//!
//! ## Components
//!
//! - `file_change`: Enum types for categorizing changes
//! - `inspector`: Core logic for detecting changes
//! - `status_info`: Status information aggregation and display

pub mod file_change;
pub mod inspector;
pub mod status_info;
