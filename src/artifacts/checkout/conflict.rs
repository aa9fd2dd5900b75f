use crate::errors::RepositoryError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Fail with `UntrackedOverwrite` when writing the incoming paths would
/// clobber an untracked file.
///
/// `untracked` holds the working files that neither the current commit nor
/// the staging area know about; `incoming` the paths the operation is about
/// to write. An untracked file is in the way when it sits at an incoming
/// path, below one (the incoming file replaces its directory), or above one
/// (the incoming file needs a directory where the untracked file is).
pub fn check_untracked_overwrite<'a>(
    untracked: &BTreeSet<PathBuf>,
    incoming: impl IntoIterator<Item = &'a PathBuf>,
) -> anyhow::Result<()> {
    let incoming = incoming.into_iter().collect::<Vec<_>>();
    let paths = untracked
        .iter()
        .filter(|untracked_path| {
            incoming
                .iter()
                .any(|incoming_path| collides(untracked_path, incoming_path))
        })
        .cloned()
        .collect::<Vec<_>>();

    if paths.is_empty() {
        Ok(())
    } else {
        Err(RepositoryError::UntrackedOverwrite { paths }.into())
    }
}

fn collides(untracked: &Path, incoming: &Path) -> bool {
    untracked.starts_with(incoming) || incoming.starts_with(untracked)
}
