use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::is_recordable_path;
use crate::artifacts::objects::object::Object;
use crate::errors::RepositoryError;
use std::path::Path;

impl Repository {
    /// Stage a file, or every file below a directory
    ///
    /// A file whose content matches the head commit is dropped from the
    /// staging area instead, which also cancels a staged removal.
    pub fn add(&self, path: &str) -> anyhow::Result<()> {
        let path = self.workspace().relative_path(Path::new(path))?;
        let files = self.workspace().list_files(Some(&path))?;
        if let Some(file) = files.iter().find(|file| !is_recordable_path(file)) {
            return Err(RepositoryError::invalid_state(format!(
                "File name {file:?} cannot be recorded."
            )));
        }
        let (_, head) = self.head_commit()?;

        let mut index = self.index_mut();
        for file in files {
            let blob = self.workspace().parse_blob(&file)?;
            let blob_oid = blob.object_id()?;

            if head.blob_for(&file) == Some(&blob_oid) {
                index.unstage(&file);
            } else {
                self.database().store(&blob)?;
                index.stage(file, blob_oid);
            }
        }

        index.write_updates()
    }
}
