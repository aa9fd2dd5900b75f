use crate::areas::index::Index;
use crate::artifacts::index::index_entry::StagedChange;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::status::file_change::{FileChange, IndexChangeType, WorkspaceChangeType};
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Compares the head commit, the staging area and the working tree
#[derive(new)]
pub struct Inspector<'r> {
    head: &'r Snapshot,
    index: &'r Index,
    workspace: &'r Snapshot,
}

impl<'r> Inspector<'r> {
    /// Working files that neither the head commit nor the staging area know about
    pub fn untracked_files(&self) -> BTreeSet<PathBuf> {
        self.workspace
            .keys()
            .filter(|path| !self.head.contains_key(*path) && !self.index.is_staged(path))
            .cloned()
            .collect()
    }

    pub fn check_index_against_head(&self, path: &Path) -> IndexChangeType {
        match (self.index.entry_by_path(path), self.head.get(path)) {
            (Some(StagedChange::Add(_)), None) => IndexChangeType::Added,
            (Some(StagedChange::Add(_)), Some(_)) => IndexChangeType::Modified,
            (Some(StagedChange::Remove), _) => IndexChangeType::Deleted,
            (None, _) => IndexChangeType::None,
        }
    }

    /// Classify the working file, first matching rule wins:
    ///
    /// 1. tracked, changed on disk and not staged: modified
    /// 2. tracked, gone from disk and not staged for removal: deleted
    /// 3. staged, gone from disk: deleted
    /// 4. staged, changed on disk since staging: modified
    /// 5. on disk, unknown to the head commit and the staging area (or
    ///    re-created after being staged for removal): untracked
    pub fn check_workspace(&self, path: &Path) -> WorkspaceChangeType {
        let working = self.workspace.get(path);
        let staged = self.index.entry_by_path(path);

        match (self.head.get(path), staged, working) {
            (Some(head_oid), None, Some(working_oid)) if head_oid != working_oid => {
                WorkspaceChangeType::Modified
            }
            (Some(_), None, None) => WorkspaceChangeType::Deleted,
            (_, Some(StagedChange::Add(_)), None) => WorkspaceChangeType::Deleted,
            (_, Some(StagedChange::Add(staged_oid)), Some(working_oid))
                if staged_oid != working_oid =>
            {
                WorkspaceChangeType::Modified
            }
            (None, None, Some(_)) | (_, Some(StagedChange::Remove), Some(_)) => {
                WorkspaceChangeType::Untracked
            }
            _ => WorkspaceChangeType::None,
        }
    }

    /// Every path that differs in at least one area, with its classification
    pub fn changed_files(&self) -> BTreeMap<PathBuf, FileChange> {
        let paths = self
            .head
            .keys()
            .chain(self.workspace.keys())
            .cloned()
            .chain(self.index.entries().map(|entry| entry.name))
            .collect::<BTreeSet<_>>();

        paths
            .into_iter()
            .filter_map(|path| {
                let change = FileChange {
                    workspace_change: self.check_workspace(&path),
                    index_change: self.check_index_against_head(&path),
                };

                (change != FileChange::default()).then_some((path, change))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::object_id::ObjectId;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn oid(content: &str) -> ObjectId {
        ObjectId::digest([content])
    }

    fn snapshot(entries: &[(&str, &str)]) -> Snapshot {
        entries
            .iter()
            .map(|(path, content)| (PathBuf::from(path), oid(content)))
            .collect()
    }

    fn index_with(entries: &[(&str, Option<&str>)]) -> Index {
        let mut index = Index::new(PathBuf::from("unused").into_boxed_path());
        for (path, content) in entries {
            match content {
                Some(content) => index.stage(PathBuf::from(path), oid(content)),
                None => index.mark_removal(PathBuf::from(path)),
            }
        }
        index
    }

    #[rstest]
    #[case::unchanged(Some("v1"), None, Some("v1"), WorkspaceChangeType::None)]
    #[case::edited_tracked(Some("v1"), None, Some("v2"), WorkspaceChangeType::Modified)]
    #[case::deleted_tracked(Some("v1"), None, None, WorkspaceChangeType::Deleted)]
    #[case::staged_then_deleted(None, Some(Some("v1")), None, WorkspaceChangeType::Deleted)]
    #[case::staged_then_edited(Some("v0"), Some(Some("v1")), Some("v2"), WorkspaceChangeType::Modified)]
    #[case::staged_as_is(None, Some(Some("v1")), Some("v1"), WorkspaceChangeType::None)]
    #[case::removed_and_gone(Some("v1"), Some(None), None, WorkspaceChangeType::None)]
    #[case::removed_and_recreated(Some("v1"), Some(None), Some("v1"), WorkspaceChangeType::Untracked)]
    #[case::new_file(None, None, Some("v1"), WorkspaceChangeType::Untracked)]
    fn classifies_the_working_file(
        #[case] head: Option<&str>,
        #[case] staged: Option<Option<&str>>,
        #[case] working: Option<&str>,
        #[case] expected: WorkspaceChangeType,
    ) {
        let head = snapshot(&head.map(|c| vec![("f", c)]).unwrap_or_default());
        let index = index_with(&staged.map(|c| vec![("f", c)]).unwrap_or_default());
        let workspace = snapshot(&working.map(|c| vec![("f", c)]).unwrap_or_default());

        let inspector = Inspector::new(&head, &index, &workspace);

        assert_eq!(inspector.check_workspace(Path::new("f")), expected);
    }

    #[test]
    fn untracked_files_exclude_staged_and_committed_ones() {
        let head = snapshot(&[("committed", "c")]);
        let index = index_with(&[("staged", Some("s"))]);
        let workspace = snapshot(&[("committed", "c"), ("staged", "s"), ("stray", "x")]);

        let inspector = Inspector::new(&head, &index, &workspace);

        assert_eq!(
            inspector.untracked_files(),
            BTreeSet::from([PathBuf::from("stray")])
        );
    }

    #[test]
    fn changed_files_skip_clean_paths() {
        let head = snapshot(&[("clean", "c"), ("gone", "g")]);
        let index = index_with(&[("gone", None), ("new", Some("n"))]);
        let workspace = snapshot(&[("clean", "c"), ("new", "n")]);

        let changes = Inspector::new(&head, &index, &workspace).changed_files();

        assert_eq!(
            changes.keys().cloned().collect::<Vec<_>>(),
            vec![PathBuf::from("gone"), PathBuf::from("new")]
        );
        assert_eq!(changes[Path::new("gone")].index_change, IndexChangeType::Deleted);
        assert_eq!(changes[Path::new("new")].index_change, IndexChangeType::Added);
    }
}
