use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::commit::{Commit, Snapshot};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::status::inspector::Inspector;
use crate::errors::RepositoryError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const DETACHMENT_NOTICE: &str = r#"
You are in 'detached HEAD' state. You can look around, make experimental
changes and commit them, and you can discard any commits you make in this
state without impacting any branches by performing another checkout.

If you want to create a new branch to retain commits you create, you may
do so (now or later) by using the branch command. Example:

    sprig branch <new-branch-name>
"#;

impl Repository {
    /// Restore one file from a commit (HEAD when `commit` is `None`)
    ///
    /// The staging area is left alone.
    pub fn checkout_file(&self, commit: Option<&str>, file: &str) -> anyhow::Result<()> {
        let commit_oid = match commit {
            Some(prefix) => self.database().resolve_commit_prefix(prefix)?,
            None => self.refs().read_head()?,
        };
        let commit = self.database().parse_object_as_commit(&commit_oid)?;
        let path = self.workspace().relative_path(Path::new(file))?;

        let blob_oid = commit
            .blob_for(&path)
            .ok_or_else(|| RepositoryError::not_found("File does not exist in that commit."))?;
        let blob = self.database().parse_object_as_blob(blob_oid)?;

        self.workspace().write_file(&path, blob.content())
    }

    /// Switch to a branch, or detach HEAD at a commit when no branch has
    /// that name
    pub fn checkout(&self, target: &str) -> anyhow::Result<()> {
        let branch = BranchName::try_parse(target.to_string())
            .ok()
            .filter(|name| self.refs().branch_exists(name));

        match branch {
            Some(branch) => self.checkout_branch(&branch),
            None => self.checkout_detached(target),
        }
    }

    fn checkout_branch(&self, branch: &BranchName) -> anyhow::Result<()> {
        if self.refs().is_current_branch(branch)? {
            return Err(RepositoryError::invalid_state(
                "No need to checkout the current branch.",
            ));
        }

        let target_oid = self.refs().read_branch(branch)?;
        self.checkout_commit(&target_oid)?;
        self.refs().set_head_branch(branch)?;

        eprintln!("Switched to branch '{}'", branch);

        Ok(())
    }

    fn checkout_detached(&self, target: &str) -> anyhow::Result<()> {
        let candidates = match ObjectId::is_valid_prefix(target) {
            true => self
                .database()
                .find_objects_by_prefix(ObjectType::Commit, target)?,
            false => vec![],
        };

        let target_oid = match candidates.as_slice() {
            [] => return Err(RepositoryError::not_found("No such branch exists.")),
            [target_oid] => target_oid.clone(),
            _ => {
                return Err(RepositoryError::ambiguous_or_not_found(format!(
                    "Commit id {target} is ambiguous."
                )));
            }
        };

        let was_detached = self.refs().current_branch()?.is_none();
        self.checkout_commit(&target_oid)?;
        self.refs().detach_head(&target_oid)?;

        if !was_detached {
            eprintln!("Note: checking out '{}'.\n{}", target, DETACHMENT_NOTICE);
        }
        let commit = self.database().parse_object_as_commit(&target_oid)?;
        eprintln!(
            "HEAD is now at {} {}",
            target_oid.to_short_oid(),
            commit.message().lines().next().unwrap_or_default()
        );

        Ok(())
    }

    /// Replace the working tree with the snapshot of `target_oid` and clear
    /// the staging area; HEAD is not moved.
    ///
    /// Fails before touching anything when an untracked file would be
    /// overwritten.
    pub fn checkout_commit(&self, target_oid: &ObjectId) -> anyhow::Result<()> {
        let (_, head) = self.head_commit()?;
        let target = self.database().parse_object_as_commit(target_oid)?;
        let workspace = self.workspace().snapshot()?;
        let untracked = self.untracked_files(&head, &workspace);

        let migration = Migration::plan(head.snapshot(), target.snapshot(), &workspace, &untracked)?;
        if !migration.is_empty() {
            self.workspace()
                .apply_migration(&migration, self.database())?;
        }

        let mut index = self.index_mut();
        index.clear();
        index.write_updates()
    }

    /// Working files unknown to both `head` and the staging area
    pub fn untracked_files(&self, head: &Commit, workspace: &Snapshot) -> BTreeSet<PathBuf> {
        let index = self.index();
        Inspector::new(head.snapshot(), &index, workspace).untracked_files()
    }
}
