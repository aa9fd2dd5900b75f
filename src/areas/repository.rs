use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::{REPOSITORY_DIR, Workspace};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use std::cell::{Ref, RefCell, RefMut};
use std::path::Path;

const INDEX_FILE_NAME: &str = "index";

/// Every area of one repository, opened for the duration of a command
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Wire up the areas rooted at `path` without touching the disk
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = path
            .canonicalize()
            .with_context(|| format!("Unable to resolve working directory {}", path.display()))?;
        let repository_path = path.join(REPOSITORY_DIR);

        Ok(Repository {
            writer: RefCell::new(writer),
            index: RefCell::new(Index::new(
                repository_path.join(INDEX_FILE_NAME).into_boxed_path(),
            )),
            database: Database::new(repository_path.clone().into_boxed_path()),
            workspace: Workspace::new(path.clone().into_boxed_path()),
            refs: Refs::new(repository_path.into_boxed_path()),
            path: path.into_boxed_path(),
        })
    }

    /// Open an initialized repository and load its staging area
    pub fn open(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let repository = Self::new(path, writer)?;

        if !repository.is_initialized() {
            return Err(RepositoryError::invalid_state(
                "Not in an initialized sprig directory.",
            ));
        }

        repository.index_mut().rehydrate()?;

        Ok(repository)
    }

    pub fn is_initialized(&self) -> bool {
        self.repository_path().is_dir()
    }

    pub fn repository_path(&self) -> Box<Path> {
        self.path.join(REPOSITORY_DIR).into_boxed_path()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&'_ self) -> Ref<'_, Index> {
        self.index.borrow()
    }

    pub fn index_mut(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// The commit HEAD resolves to, with its id
    pub fn head_commit(&self) -> anyhow::Result<(ObjectId, Commit)> {
        let head_oid = self.refs.read_head()?;
        let head = self.database.parse_object_as_commit(&head_oid)?;

        Ok((head_oid, head))
    }
}
