//! Merge algorithms
//!
//! - `bca_finder`: best common ancestor (split point) search
//! - `resolver`: per-path three-way resolution and conflict file contents

pub mod bca_finder;
pub mod resolver;
