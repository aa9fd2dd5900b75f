use colored::Colorize;

/// How the working file differs from what the next commit would record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum WorkspaceChangeType {
    #[default]
    None,
    Untracked,
    Modified,
    Deleted,
}

impl From<&WorkspaceChangeType> for &str {
    fn from(change: &WorkspaceChangeType) -> Self {
        match change {
            WorkspaceChangeType::None => "",
            WorkspaceChangeType::Untracked => "untracked",
            WorkspaceChangeType::Modified => "modified",
            WorkspaceChangeType::Deleted => "deleted",
        }
    }
}

/// How the staging area differs from the head commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum IndexChangeType {
    #[default]
    None,
    Added,
    Modified,
    Deleted,
}

impl IndexChangeType {
    /// Additions and modifications are both listed as staged files
    pub fn is_staged_file(&self) -> bool {
        matches!(self, IndexChangeType::Added | IndexChangeType::Modified)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FileChange {
    pub workspace_change: WorkspaceChangeType,
    pub index_change: IndexChangeType,
}

impl std::fmt::Display for WorkspaceChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label: &str = self.into();
        let colored_str = match self {
            WorkspaceChangeType::Modified | WorkspaceChangeType::Deleted => label.red(),
            WorkspaceChangeType::None | WorkspaceChangeType::Untracked => label.normal(),
        };
        write!(f, "{}", colored_str)
    }
}
