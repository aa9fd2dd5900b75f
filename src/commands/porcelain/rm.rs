use crate::areas::repository::Repository;
use crate::errors::RepositoryError;
use std::path::Path;

impl Repository {
    /// Unstage a file and, when the head commit tracks it, stage its removal
    /// and delete it from the working tree
    pub fn rm(&self, path: &str) -> anyhow::Result<()> {
        let path = self.workspace().relative_path(Path::new(path))?;
        let (_, head) = self.head_commit()?;
        let mut index = self.index_mut();

        if !index.is_staged(&path) && !head.tracks(&path) {
            return Err(RepositoryError::invalid_state(
                "No reason to remove the file.",
            ));
        }

        index.unstage(&path);
        if head.tracks(&path) {
            self.workspace().remove_file(&path)?;
            index.mark_removal(path);
        }

        index.write_updates()
    }
}
