//! Staging area entry
//!
//! Each entry records the intent for one path in the next commit:
//! - `Add(oid)`: the path will point at this blob
//! - `Remove`: the path will be dropped from the snapshot
//!
//! An entry is the fixed 23-byte block (kind, blob id, path length) followed
//! by the path bytes.

use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::anyhow;
use byteorder::{ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Size of the fixed part of an entry: kind, binary blob id and path length
pub const ENTRY_FIXED_SIZE: usize = 1 + 20 + 2;

const KIND_ADD: u8 = 1;
const KIND_REMOVE: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedChange {
    Add(ObjectId),
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// File path relative to the working tree root
    pub name: PathBuf,
    pub change: StagedChange,
}

impl IndexEntry {
    /// Length of the path that follows the fixed block of a serialized entry
    pub fn path_len(fixed_block: &[u8]) -> anyhow::Result<usize> {
        let mut length = fixed_block
            .get(ENTRY_FIXED_SIZE - 2..ENTRY_FIXED_SIZE)
            .ok_or_else(|| anyhow!("Truncated index entry"))?;

        Ok(length.read_u16::<byteorder::NetworkEndian>()? as usize)
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let path = self.name.to_string_lossy();
        let path_len = u16::try_from(path.len())
            .map_err(|_| anyhow!("Path too long for the index: {}", self.name.display()))?;

        let mut bytes = Vec::with_capacity(ENTRY_FIXED_SIZE + path.len());
        match &self.change {
            StagedChange::Add(oid) => {
                bytes.write_u8(KIND_ADD)?;
                oid.write_h40_to(&mut bytes)?;
            }
            StagedChange::Remove => {
                bytes.write_u8(KIND_REMOVE)?;
                bytes.write_all(&[0u8; 20])?;
            }
        }
        bytes.write_u16::<byteorder::NetworkEndian>(path_len)?;
        bytes.write_all(path.as_bytes())?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let kind = reader.read_u8()?;
        let change = match kind {
            KIND_ADD => StagedChange::Add(ObjectId::read_h40_from(&mut reader)?),
            KIND_REMOVE => {
                let mut zeros = [0u8; 20];
                reader.read_exact(&mut zeros)?;
                StagedChange::Remove
            }
            _ => return Err(anyhow!("Invalid index entry kind: {kind}")),
        };

        let path_len = reader.read_u16::<byteorder::NetworkEndian>()? as usize;
        let mut path = vec![0u8; path_len];
        reader.read_exact(&mut path)?;
        let path = String::from_utf8(path).map_err(|_| anyhow!("Invalid path in index entry"))?;

        Ok(IndexEntry::new(PathBuf::from(path), change))
    }
}
