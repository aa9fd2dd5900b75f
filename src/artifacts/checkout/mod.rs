//! Checkout planning and the untracked-file guard
//!
//! Switching the working tree to another commit is planned in full before
//! anything is touched: the plan is rejected when it would overwrite an
//! untracked file, and otherwise applied by the workspace.

pub mod conflict;
pub mod migration;
