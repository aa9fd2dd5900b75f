//! Checkout migration planning
//!
//! A migration turns the working tree of the current commit into the working
//! tree of a target commit:
//!
//! 1. Reject the move if it would overwrite an untracked file
//! 2. Write every target file whose working content differs (add or modify)
//! 3. Delete every file the current commit tracks and the target does not
//!
//! Planning only reads snapshots; the workspace applies the plan.

use crate::artifacts::checkout::conflict::check_untracked_overwrite;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Type of file system action required for checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionType {
    /// Create new file
    Add,
    /// Delete file
    Delete,
    /// Overwrite existing file
    Modify,
}

#[derive(Debug, Default)]
pub struct Migration {
    actions: BTreeMap<ActionType, Vec<(PathBuf, Option<ObjectId>)>>,
}

impl Migration {
    /// Plan the move from `current` to `target`.
    ///
    /// `workspace` maps working files to their content hash, `untracked`
    /// lists the working files unknown to both the current commit and the
    /// staging area.
    pub fn plan(
        current: &Snapshot,
        target: &Snapshot,
        workspace: &Snapshot,
        untracked: &BTreeSet<PathBuf>,
    ) -> anyhow::Result<Self> {
        check_untracked_overwrite(untracked, target.keys())?;

        let mut migration = Migration::default();

        for (path, oid) in target {
            match workspace.get(path) {
                Some(working_oid) if working_oid == oid => {}
                Some(_) => migration.record(ActionType::Modify, path, Some(oid)),
                None => migration.record(ActionType::Add, path, Some(oid)),
            }
        }

        for path in current.keys().filter(|path| !target.contains_key(*path)) {
            migration.record(ActionType::Delete, path, None);
        }

        Ok(migration)
    }

    fn record(&mut self, action: ActionType, path: &PathBuf, oid: Option<&ObjectId>) {
        self.actions
            .entry(action)
            .or_default()
            .push((path.clone(), oid.cloned()));
    }

    pub fn is_empty(&self) -> bool {
        self.actions.values().all(Vec::is_empty)
    }

    pub fn paths_for(&self, action: ActionType) -> impl Iterator<Item = &PathBuf> {
        self.actions
            .get(&action)
            .into_iter()
            .flatten()
            .map(|(path, _)| path)
    }

    /// Paths to write together with the blob they receive
    pub fn writes_for(&self, action: ActionType) -> impl Iterator<Item = (&PathBuf, &ObjectId)> {
        self.actions
            .get(&action)
            .into_iter()
            .flatten()
            .filter_map(|(path, oid)| oid.as_ref().map(|oid| (path, oid)))
    }
}
