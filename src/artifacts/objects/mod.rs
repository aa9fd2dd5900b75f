//! Persisted object types
//!
//! Everything the repository records is an immutable object identified by a
//! SHA-1 hash. There are two kinds:
//!
//! - **Blob**: raw file content
//! - **Commit**: message, timestamp, parent links and the snapshot of tracked files
//!
//! Objects are stored zlib-compressed under a directory per kind.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Shortest abbreviated commit id accepted on the command line
pub const MIN_PREFIX_LENGTH: usize = 4;
