use crate::areas::repository::Repository;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::cmp::Reverse;
use std::io::Write;

impl Repository {
    /// History of HEAD along first parents, newest first
    pub fn log(&self) -> anyhow::Result<()> {
        let head_oid = self.refs().read_head()?;

        for entry in RevList::new(self.database(), head_oid) {
            let (commit_oid, commit) = entry?;
            self.display_commit(&commit_oid, &commit)?;
        }

        Ok(())
    }

    /// Every commit ever made, newest first (ties broken by id)
    pub fn global_log(&self) -> anyhow::Result<()> {
        let mut commits = self
            .database()
            .list_commits()?
            .into_iter()
            .map(|commit_oid| {
                let commit = self.database().parse_object_as_commit(&commit_oid)?;
                Ok::<_, anyhow::Error>((commit_oid, commit))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        commits.sort_by_key(|(commit_oid, commit)| (Reverse(commit.timestamp()), commit_oid.clone()));

        for (commit_oid, commit) in &commits {
            self.display_commit(commit_oid, commit)?;
        }

        Ok(())
    }

    /// Ids of every commit with exactly this message
    pub fn find(&self, message: &str) -> anyhow::Result<()> {
        let mut found = false;

        for commit_oid in self.database().list_commits()? {
            let commit = self.database().parse_object_as_commit(&commit_oid)?;
            if commit.message() == message {
                writeln!(self.writer(), "{commit_oid}")?;
                found = true;
            }
        }

        if !found {
            return Err(RepositoryError::not_found(
                "Found no commit with that message.",
            ));
        }

        Ok(())
    }

    fn display_commit(&self, commit_oid: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "===")?;
        writeln!(writer, "commit {commit_oid}")?;
        if let (Some(first_parent), Some(second_parent)) =
            (commit.parent(), commit.second_parent())
        {
            writeln!(
                writer,
                "Merge: {} {}",
                first_parent.to_short_oid(),
                second_parent.to_short_oid()
            )?;
        }
        writeln!(writer, "Date: {}", commit.readable_timestamp())?;
        writeln!(writer, "{}", commit.message())?;
        writeln!(writer)?;

        Ok(())
    }
}
