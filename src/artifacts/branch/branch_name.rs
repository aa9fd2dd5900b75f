use crate::artifacts::branch::{DEFAULT_BRANCH, INVALID_BRANCH_NAME_REGEX};
use crate::errors::RepositoryError;
use anyhow::Context;
use std::path::Path;

/// Prefix of symbolic references to branches, relative to the repository directory
pub const REF_PREFIX: &str = "refs/heads/";

/// A path-safe branch name; hierarchical names like `feature/x` are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> anyhow::Result<Self> {
        if name.is_empty() {
            return Err(RepositoryError::invalid_state(
                "A branch name cannot be empty.",
            ));
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            Err(RepositoryError::invalid_state(format!(
                "'{name}' is not a valid branch name."
            )))
        } else {
            Ok(Self(name))
        }
    }

    /// Parse the target of a symbolic reference such as `refs/heads/master`
    pub fn try_parse_sym_ref(sym_ref: &str) -> anyhow::Result<Self> {
        let name = sym_ref.strip_prefix(REF_PREFIX).ok_or_else(|| {
            RepositoryError::invalid_state(format!(
                "symbolic ref must start with '{REF_PREFIX}', got '{sym_ref}'"
            ))
        })?;

        Self::try_parse(name.to_string())
    }

    pub fn default_branch() -> Self {
        Self(DEFAULT_BRANCH.to_string())
    }

    pub fn to_sym_ref(&self) -> String {
        format!("{REF_PREFIX}{}", self.0)
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
