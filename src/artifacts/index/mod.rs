//! Staging area file format
//!
//! The staging area records, per path, what the next commit should do with it:
//! take a new blob, or drop the path.
//!
//! ## File Format (Version 1)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "SPRG" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length, sorted by path):
//!   - Kind: 1 = add, 2 = remove (1 byte)
//!   - Blob id, zeros for a removal (20 bytes)
//!   - Path length (2 bytes)
//!   - Path (UTF-8)
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod index_entry;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12; // 4 bytes for marker, 4 for version, 4 for entries_count

/// Magic signature identifying index files
pub const SIGNATURE: &str = "SPRG";

/// Index file format version
pub const VERSION: u32 = 1;
