use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::RepositoryError;
use anyhow::Context;
use std::fs;

impl Repository {
    /// Create the repository directory, the root commit and the default branch
    pub fn init(&self) -> anyhow::Result<()> {
        if self.is_initialized() {
            return Err(RepositoryError::duplicate_object(
                "A sprig repository already exists in the current directory.",
            ));
        }

        for object_type in [ObjectType::Commit, ObjectType::Blob] {
            let objects_path = self.database().objects_path(object_type);
            fs::create_dir_all(&objects_path)
                .with_context(|| format!("Failed to create {}", objects_path.display()))?;
        }

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create the refs/heads directory")?;

        let root_oid = self.database().store(&Commit::root())?;
        let default_branch = BranchName::default_branch();

        self.refs()
            .create_branch(&default_branch, &root_oid)
            .context("Failed to create the default branch")?;
        self.refs()
            .set_head_branch(&default_branch)
            .context("Failed to create the initial HEAD reference")?;

        let mut index = self.index_mut();
        index.clear();
        index.write_updates()?;

        Ok(())
    }
}
