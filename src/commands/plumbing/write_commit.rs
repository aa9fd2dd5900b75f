use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Commit, commit_timestamp_from_env};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;

impl Repository {
    /// Record the staging area as a new commit and move HEAD to it
    ///
    /// The snapshot is the first parent's snapshot minus staged removals plus
    /// staged additions. The staging area is cleared afterwards.
    pub fn write_commit(&self, parents: Vec<ObjectId>, message: &str) -> anyhow::Result<ObjectId> {
        let first_parent = parents
            .first()
            .context("A commit needs at least one parent")?;
        let mut snapshot = self
            .database()
            .parse_object_as_commit(first_parent)?
            .snapshot()
            .clone();

        {
            let index = self.index();
            for path in index.removals() {
                snapshot.remove(path);
            }
            for (path, blob_oid) in index.additions() {
                snapshot.insert(path.clone(), blob_oid.clone());
            }
        }

        let commit = Commit::new(
            message.to_string(),
            commit_timestamp_from_env(),
            parents,
            snapshot,
        );
        let commit_oid = self.database().store(&commit)?;
        self.refs().update_head(&commit_oid)?;

        let mut index = self.index_mut();
        index.clear();
        index.write_updates()?;

        Ok(commit_oid)
    }
}
