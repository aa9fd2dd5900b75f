//! Staging area
//!
//! The staging area maps paths to the change the next commit will record for
//! them. It is loaded once per command, mutated in memory and written back in
//! full.
//!
//! ## Index File Format
//!
//! The index file contains:
//! - Header: Signature, version, and entry count
//! - Entries: Sorted list of staged changes
//! - Checksum: SHA-1 hash of the entire index for integrity verification

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_FIXED_SIZE, IndexEntry, StagedChange};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::collections::BTreeMap;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (`.sprig/index`)
    path: Box<Path>,
    entries: BTreeMap<PathBuf, StagedChange>,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&StagedChange> {
        self.entries.get(path)
    }

    pub fn is_staged(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Record `oid` as the next content of `path`, replacing any prior entry
    pub fn stage(&mut self, path: PathBuf, oid: ObjectId) {
        self.entries.insert(path, StagedChange::Add(oid));
    }

    /// Record that `path` will be dropped from the next snapshot
    pub fn mark_removal(&mut self, path: PathBuf) {
        self.entries.insert(path, StagedChange::Remove);
    }

    /// Forget whatever was staged for `path`; returns whether there was an entry
    pub fn unstage(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Paths staged with a new blob
    pub fn additions(&self) -> impl Iterator<Item = (&PathBuf, &ObjectId)> {
        self.entries.iter().filter_map(|(path, change)| match change {
            StagedChange::Add(oid) => Some((path, oid)),
            StagedChange::Remove => None,
        })
    }

    /// Paths staged for removal
    pub fn removals(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries
            .iter()
            .filter(|(_, change)| **change == StagedChange::Remove)
            .map(|(path, _)| path)
    }

    pub fn entries(&self) -> impl Iterator<Item = IndexEntry> + '_ {
        self.entries
            .iter()
            .map(|(path, change)| IndexEntry::new(path.clone(), change.clone()))
    }

    /// Load the index from disk
    ///
    /// A missing or empty file is an empty staging area. A checksum mismatch
    /// is an error.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();

        if !self.path().exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);
        let entries_count = Self::parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;

        reader.verify()
    }

    fn parse_header(reader: &mut Checksum) -> anyhow::Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(header_bytes.as_ref())?;

        if header.marker != SIGNATURE {
            return Err(RepositoryError::invalid_state("Invalid index file signature"));
        }

        if header.version != VERSION {
            return Err(RepositoryError::invalid_state(format!(
                "Unsupported index file version: {}",
                header.version
            )));
        }

        Ok(header.entries_count)
    }

    fn parse_entries(&mut self, entries_count: u32, reader: &mut Checksum) -> anyhow::Result<()> {
        for _ in 0..entries_count {
            let fixed_block = reader.read(ENTRY_FIXED_SIZE)?;
            let path_bytes = reader.read(IndexEntry::path_len(&fixed_block)?)?;

            let entry_bytes = [fixed_block.as_ref(), path_bytes.as_ref()].concat();
            let entry = IndexEntry::deserialize(entry_bytes.as_slice())?;

            self.entries.insert(entry.name, entry.change);
        }

        Ok(())
    }

    /// Write the whole staging area back to disk
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on the index file during writing.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(lock);

        let header = IndexHeader {
            entries_count: u32::try_from(self.entries.len())?,
            ..IndexHeader::empty()
        };
        writer.write(&header.serialize()?)?;

        for entry in self.entries() {
            writer.write(&entry.serialize()?)?;
        }

        writer.write_checksum()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn index() -> (TempDir, Index) {
        let dir = TempDir::new().unwrap();
        let index = Index::new(dir.path().join("index").into_boxed_path());
        (dir, index)
    }

    #[rstest]
    fn missing_file_is_an_empty_staging_area(index: (TempDir, Index)) {
        let (_dir, mut index) = index;

        index.rehydrate().unwrap();

        assert!(index.is_empty());
    }

    #[rstest]
    fn staged_entries_survive_a_write_and_reload(index: (TempDir, Index)) {
        let (_dir, mut index) = index;
        let oid = ObjectId::digest(["a"]);
        index.stage(PathBuf::from("b/a.txt"), oid.clone());
        index.mark_removal(PathBuf::from("c.txt"));
        index.write_updates().unwrap();

        let mut reloaded = Index::new(index.path().into());
        reloaded.rehydrate().unwrap();

        assert_eq!(
            reloaded.additions().collect::<Vec<_>>(),
            vec![(&PathBuf::from("b/a.txt"), &oid)]
        );
        assert_eq!(
            reloaded.removals().collect::<Vec<_>>(),
            vec![&PathBuf::from("c.txt")]
        );
    }

    #[rstest]
    fn staging_a_removal_replaces_an_addition(index: (TempDir, Index)) {
        let (_dir, mut index) = index;
        index.stage(PathBuf::from("a.txt"), ObjectId::digest(["a"]));
        index.mark_removal(PathBuf::from("a.txt"));

        assert_eq!(
            index.entry_by_path(Path::new("a.txt")),
            Some(&StagedChange::Remove)
        );
        assert!(index.unstage(Path::new("a.txt")));
        assert!(!index.unstage(Path::new("a.txt")));
        assert!(index.is_empty());
    }

    #[rstest]
    fn corrupted_file_fails_the_checksum(index: (TempDir, Index)) {
        let (_dir, mut index) = index;
        index.stage(PathBuf::from("a.txt"), ObjectId::digest(["a"]));
        index.write_updates().unwrap();

        let mut bytes = std::fs::read(index.path()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        std::fs::write(index.path(), bytes).unwrap();

        let error = index.rehydrate().unwrap_err();

        assert!(matches!(
            error.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::InvalidState(_))
        ));
    }
}
