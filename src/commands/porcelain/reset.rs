use crate::areas::repository::Repository;

impl Repository {
    /// Check out any commit and move the current branch (or the detached
    /// HEAD) to it
    pub fn reset(&self, commit: &str) -> anyhow::Result<()> {
        let target_oid = self.database().resolve_commit_prefix(commit)?;

        self.checkout_commit(&target_oid)?;
        self.refs().update_head(&target_oid)
    }
}
