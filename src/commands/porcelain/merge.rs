use crate::areas::refs::HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::conflict::check_untracked_overwrite;
use crate::artifacts::merge::bca_finder::BCAFinder;
use crate::artifacts::merge::resolver::{Resolution, conflict_content, path_universe, resolve};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use crate::debug_log;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    /// Merge the given branch into the current one
    ///
    /// Fast-forwards when the current tip is the split point, does nothing
    /// when the given tip is, and otherwise records a merge commit with the
    /// given tip as second parent. Conflicts are written to the working tree
    /// and staged; the merge commit is made all the same.
    pub fn merge(&self, given: &str) -> anyhow::Result<()> {
        if !self.index().is_empty() {
            return Err(RepositoryError::invalid_state(
                "You have uncommitted changes.",
            ));
        }

        let given_branch = BranchName::try_parse(given.to_string())
            .ok()
            .filter(|name| self.refs().branch_exists(name))
            .ok_or_else(|| {
                RepositoryError::not_found("A branch with that name does not exist.")
            })?;

        if self.refs().is_current_branch(&given_branch)? {
            return Err(RepositoryError::invalid_state(
                "Cannot merge a branch with itself.",
            ));
        }

        let current_oid = self.refs().read_head()?;
        let given_oid = self.refs().read_branch(&given_branch)?;
        let split_oid = BCAFinder::new(|oid: &ObjectId| self.database().parse_slim_commit(oid))
            .find_best_common_ancestor(&current_oid, &given_oid)?;

        debug_log!("Merging {given_oid} into {current_oid} from split point {split_oid}");

        if split_oid == given_oid {
            writeln!(
                self.writer(),
                "Given branch is an ancestor of the current branch."
            )?;
            return Ok(());
        }

        if split_oid == current_oid {
            self.checkout_commit(&given_oid)?;
            self.refs().update_head(&given_oid)?;
            writeln!(self.writer(), "Current branch fast-forwarded.")?;
            return Ok(());
        }

        let had_conflict = self.merge_snapshots(&split_oid, &current_oid, &given_oid)?;

        let current_name = self
            .refs()
            .current_branch()?
            .map(|branch| branch.to_string())
            .unwrap_or_else(|| HEAD_REF_NAME.to_string());
        self.write_commit(
            vec![current_oid, given_oid],
            &format!("Merged {given_branch} into {current_name}."),
        )?;

        if had_conflict {
            writeln!(self.writer(), "Encountered a merge conflict.")?;
        }

        Ok(())
    }

    /// Resolve every path of the three snapshots into the working tree and
    /// the staging area; returns whether any path conflicted
    fn merge_snapshots(
        &self,
        split_oid: &ObjectId,
        current_oid: &ObjectId,
        given_oid: &ObjectId,
    ) -> anyhow::Result<bool> {
        let split = self.database().parse_object_as_commit(split_oid)?;
        let current = self.database().parse_object_as_commit(current_oid)?;
        let given = self.database().parse_object_as_commit(given_oid)?;

        let resolutions = path_universe(split.snapshot(), current.snapshot(), given.snapshot())
            .into_iter()
            .map(|path| {
                let resolution = resolve(
                    split.blob_for(&path),
                    current.blob_for(&path),
                    given.blob_for(&path),
                );
                debug_log!("{} -> {:?}", path.display(), resolution);
                (path, resolution)
            })
            .collect::<Vec<_>>();

        let written_paths = resolutions
            .iter()
            .filter(|(_, resolution)| {
                matches!(
                    resolution,
                    Resolution::TakeGiven(_) | Resolution::Conflict { .. }
                )
            })
            .map(|(path, _)| path);
        let workspace = self.workspace().snapshot()?;
        let untracked = self.untracked_files(&current, &workspace);
        check_untracked_overwrite(&untracked, given.snapshot().keys().chain(written_paths))?;

        let mut had_conflict = false;
        let mut index = self.index_mut();

        for (path, resolution) in resolutions {
            match resolution {
                Resolution::KeepCurrent => {}
                Resolution::TakeGiven(blob_oid) => {
                    let blob = self.database().parse_object_as_blob(&blob_oid)?;
                    self.workspace().write_file(&path, blob.content())?;
                    index.stage(path, blob_oid);
                }
                Resolution::Remove => {
                    self.workspace().remove_file(&path)?;
                    index.mark_removal(path);
                }
                Resolution::Conflict { current, given } => {
                    let blob = Blob::new(conflict_content(
                        self.blob_content(current.as_ref())?.as_deref(),
                        self.blob_content(given.as_ref())?.as_deref(),
                    ));
                    let blob_oid = self.database().store(&blob)?;
                    self.workspace().write_file(&path, blob.content())?;
                    index.stage(path, blob_oid);
                    had_conflict = true;
                }
            }
        }

        index.write_updates()?;

        Ok(had_conflict)
    }

    fn blob_content(&self, blob_oid: Option<&ObjectId>) -> anyhow::Result<Option<Vec<u8>>> {
        blob_oid
            .map(|blob_oid| {
                self.database()
                    .parse_object_as_blob(blob_oid)
                    .map(|blob| blob.content().to_vec())
            })
            .transpose()
    }
}
