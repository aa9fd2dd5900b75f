//! References: HEAD and branches
//!
//! Branches are files under `refs/heads/` holding the 40-character id of their
//! tip commit. HEAD holds either:
//! - `ref: refs/heads/<name>` when a branch is checked out (symbolic)
//! - a 40-character commit id when detached

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use walkdir::WalkDir;

const SYMREF_REGEX: &str = r"^ref: (.+)$";

pub const HEAD_REF_NAME: &str = "HEAD";

const NO_SUCH_BRANCH: &str = "A branch with that name does not exist.";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository directory (`.sprig`)
    path: Box<Path>,
}

/// What HEAD points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    Branch(BranchName),
    Detached(ObjectId),
}

impl Head {
    fn parse(content: &str) -> anyhow::Result<Self> {
        let content = content.trim();
        let malformed = || RepositoryError::invalid_state(format!("HEAD is malformed: '{content}'"));

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        match symref_match {
            Some(symref_match) => BranchName::try_parse_sym_ref(&symref_match[1])
                .map(Head::Branch)
                .map_err(|_| malformed()),
            None => ObjectId::try_parse(content.to_string())
                .map(Head::Detached)
                .map_err(|_| malformed()),
        }
    }

    fn to_ref_content(&self) -> String {
        match self {
            Head::Branch(name) => format!("ref: {}", name.to_sym_ref()),
            Head::Detached(oid) => oid.to_string(),
        }
    }
}

impl Refs {
    pub fn head(&self) -> anyhow::Result<Head> {
        let head_path = self.head_path();
        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read HEAD at {:?}", head_path))?;

        Head::parse(&content)
    }

    /// Id of the commit HEAD resolves to, following one level of indirection
    pub fn read_head(&self) -> anyhow::Result<ObjectId> {
        match self.head()? {
            Head::Branch(name) => self.read_branch(&name).map_err(|_| {
                RepositoryError::invalid_state(format!("HEAD points to missing branch '{name}'"))
            }),
            Head::Detached(oid) => Ok(oid),
        }
    }

    /// Checked-out branch, `None` when HEAD is detached
    pub fn current_branch(&self) -> anyhow::Result<Option<BranchName>> {
        match self.head()? {
            Head::Branch(name) => Ok(Some(name)),
            Head::Detached(_) => Ok(None),
        }
    }

    pub fn is_current_branch(&self, name: &BranchName) -> anyhow::Result<bool> {
        Ok(self.current_branch()?.as_ref() == Some(name))
    }

    /// Move the checked-out branch, or the detached HEAD itself, to `oid`
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        match self.head()? {
            Head::Branch(name) => self.update_ref_file(&self.branch_path(&name), oid.as_ref()),
            Head::Detached(_) => self.detach_head(oid),
        }
    }

    pub fn set_head_branch(&self, name: &BranchName) -> anyhow::Result<()> {
        let head = Head::Branch(name.clone());
        self.update_ref_file(&self.head_path(), &head.to_ref_content())
    }

    pub fn detach_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let head = Head::Detached(oid.clone());
        self.update_ref_file(&self.head_path(), &head.to_ref_content())
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).is_file()
    }

    pub fn read_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        let branch_path = self.branch_path(name);
        if !branch_path.is_file() {
            return Err(RepositoryError::not_found(NO_SUCH_BRANCH));
        }

        let content = std::fs::read_to_string(&branch_path)
            .with_context(|| format!("failed to read ref file at {:?}", branch_path))?;

        ObjectId::try_parse(content.trim().to_string())
            .with_context(|| format!("branch {name} holds an invalid commit id"))
    }

    pub fn create_branch(&self, name: &BranchName, source_oid: &ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            return Err(RepositoryError::duplicate_object(
                "A branch with that name already exists.",
            ));
        }

        self.update_ref_file(&self.branch_path(name), source_oid.as_ref())
    }

    /// Remove a branch pointer; the commits it pointed at stay in the store
    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        if self.is_current_branch(name)? {
            return Err(RepositoryError::invalid_state(
                "Cannot remove the current branch.",
            ));
        }

        let oid = self.read_branch(name)?;
        let branch_path = self.branch_path(name);
        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {:?}", branch_path))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;

        Ok(oid)
    }

    /// Names of all branches, sorted
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads_path = self.heads_path();

        let mut branches = WalkDir::new(&heads_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&heads_path).ok()?;
                BranchName::try_parse(relative_path.to_string_lossy().replace('\\', "/")).ok()
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    fn update_ref_file(&self, path: &Path, raw_ref: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {:?}", parent)
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    fn branch_path(&self, name: &BranchName) -> Box<Path> {
        self.heads_path().join(name.as_path()).into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.path.join("refs").join("heads").into_boxed_path()
    }
}
