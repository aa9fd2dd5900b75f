/// Kind of a persisted object; each kind lives in its own directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Commit => "commit",
        }
    }

    /// Directory below the repository root holding objects of this kind
    pub fn dir_name(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blobs",
            ObjectType::Commit => "commits",
        }
    }

    /// Blobs are content addressed, so storing the same content twice is a
    /// cache hit. Commits are write-once: a second write of the same id is an error.
    pub fn is_write_once(&self) -> bool {
        matches!(self, ObjectType::Commit)
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
