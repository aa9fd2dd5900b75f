use crate::areas::database::Database;
use crate::artifacts::checkout::migration::{ActionType, Migration};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object::Object;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub const REPOSITORY_DIR: &str = ".sprig";

const IGNORED_PATHS: [&str; 1] = [REPOSITORY_DIR];

/// The working tree: every plain file below the root except the repository directory
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Express a user-supplied path relative to the working tree root
    pub fn relative_path(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let path = match path.strip_prefix(self.path.as_ref()) {
            Ok(relative) => relative,
            Err(_) if path.is_absolute() => {
                anyhow::bail!("{} is outside of the working tree", path.display())
            }
            Err(_) => path,
        };

        let mut relative = PathBuf::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::Normal(name) => relative.push(name),
                Component::ParentDir if relative.pop() => {}
                _ => anyhow::bail!("{} is outside of the working tree", path.display()),
            }
        }

        Ok(relative)
    }

    /// Files below `root_file_path` (the whole tree when `None`), relative to
    /// the working tree root and sorted
    pub fn list_files(&self, root_file_path: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
        let root_file_path = match root_file_path {
            Some(p) => self.path.join(p),
            None => self.path.to_path_buf(),
        };

        if !root_file_path.exists() {
            return Err(RepositoryError::not_found("File does not exist."));
        }

        let mut files = WalkDir::new(&root_file_path)
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry.path()))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(self.path.as_ref())
                    .ok()
                    .map(Path::to_path_buf)
            })
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    fn is_ignored(path: &Path) -> bool {
        path.file_name()
            .map(|name| IGNORED_PATHS.contains(&name.to_string_lossy().as_ref()))
            .unwrap_or(false)
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let full_path = self.path.join(file_path);

        let content = std::fs::read(&full_path)
            .with_context(|| format!("Failed to read file: {:?}", file_path))?;

        Ok(content.into())
    }

    pub fn parse_blob(&self, file_path: &Path) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    /// Map every working file to the hash of its content
    pub fn snapshot(&self) -> anyhow::Result<Snapshot> {
        self.list_files(None)?
            .into_iter()
            .map(|path| {
                let oid = self.parse_blob(&path)?.object_id()?;
                Ok::<_, anyhow::Error>((path, oid))
            })
            .collect()
    }

    /// Write `data` to the file, creating parent directories as needed
    pub fn write_file(&self, file_path: &Path, data: &[u8]) -> anyhow::Result<()> {
        let path = self.path.join(file_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for: {:?}", file_path))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to open file: {:?}", file_path))?;

        file.write_all(data)
            .with_context(|| format!("Failed to write to file: {:?}", file_path))
    }

    /// Delete the file if present and prune the directories it leaves empty
    pub fn remove_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let path = self.path.join(file_path);

        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove file: {:?}", file_path))?;
        }

        self.prune_empty_parent_dirs(&path)
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent.is_dir()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("Failed to remove empty directory: {:?}", parent))?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    // Deletions run first so that a file replaced by a directory of the same
    // name (or the other way round) is out of the way before writing. A
    // directory still holding files after that is never emptied here.
    pub fn apply_migration(&self, migration: &Migration, database: &Database) -> anyhow::Result<()> {
        for path in migration.paths_for(ActionType::Delete) {
            self.remove_file(path)?;
        }

        for action in [ActionType::Modify, ActionType::Add] {
            for (path, oid) in migration.writes_for(action) {
                let blob = database.parse_object_as_blob(oid)?;
                if self.path.join(path).is_dir() {
                    std::fs::remove_dir(self.path.join(path)).with_context(|| {
                        format!("Failed to remove directory in the way: {:?}", path)
                    })?;
                }
                self.write_file(path, blob.content())?;
            }
        }

        Ok(())
    }
}
