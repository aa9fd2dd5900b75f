//! sprig: a miniature version-control engine
//!
//! - `areas`: the on-disk parts of a repository (object store, staging area,
//!   references, working tree)
//! - `artifacts`: the data structures and algorithms behind them
//! - `commands`: one `impl Repository` block per user command
//! - `errors`: the error taxonomy reported to the user

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
