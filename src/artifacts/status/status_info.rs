use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::status::file_change::{IndexChangeType, WorkspaceChangeType};
use crate::artifacts::status::inspector::Inspector;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

pub type FileSet = BTreeSet<PathBuf>;
pub type ChangeSet = BTreeMap<PathBuf, WorkspaceChangeType>;

/// Everything the `status` command reports, sorted section by section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusInfo {
    pub branches: Vec<BranchName>,
    pub current_branch: Option<BranchName>,
    pub staged_files: FileSet,
    pub removed_files: FileSet,
    /// Tracked or staged files changed on disk without being staged again
    pub workspace_changeset: ChangeSet,
    pub untracked_files: FileSet,
}

#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

impl<'r> Status<'r> {
    pub fn initialize(&self) -> anyhow::Result<StatusInfo> {
        let refs = self.repository.refs();
        let head = self
            .repository
            .database()
            .parse_object_as_commit(&refs.read_head()?)?;
        let workspace = self.repository.workspace().snapshot()?;
        let index = self.repository.index();

        let inspector = Inspector::new(head.snapshot(), &index, &workspace);
        let mut status = StatusInfo {
            branches: refs.list_branches()?,
            current_branch: refs.current_branch()?,
            ..StatusInfo::default()
        };

        for (path, change) in inspector.changed_files() {
            if change.index_change.is_staged_file() {
                status.staged_files.insert(path.clone());
            } else if change.index_change == IndexChangeType::Deleted {
                status.removed_files.insert(path.clone());
            }

            match change.workspace_change {
                WorkspaceChangeType::None => {}
                WorkspaceChangeType::Untracked => {
                    status.untracked_files.insert(path);
                }
                WorkspaceChangeType::Modified | WorkspaceChangeType::Deleted => {
                    status.workspace_changeset.insert(path, change.workspace_change);
                }
            }
        }

        Ok(status)
    }
}
