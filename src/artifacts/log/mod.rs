//! Commit history traversal
//!
//! - `rev_list`: first-parent history, as shown by `log`
//! - `ancestors`: every commit reachable through any parent link
//!
//! Both walks are iterative (explicit cursor or stack plus a visited set), so
//! deep histories cannot overflow the call stack.

pub mod ancestors;
pub mod rev_list;
