use crate::areas::repository::Repository;
use crate::artifacts::status::status_info::{FileSet, Status, StatusInfo};
use std::io::Write;

impl Repository {
    /// Print the branches, the staging area and the working tree changes
    pub fn status(&self) -> anyhow::Result<()> {
        let status = Status::new(self).initialize()?;

        self.print_branches(&status)?;
        self.print_file_section("Staged Files", &status.staged_files)?;
        self.print_file_section("Removed Files", &status.removed_files)?;

        writeln!(self.writer(), "=== Modifications Not Staged For Commit ===")?;
        for (path, change) in &status.workspace_changeset {
            writeln!(self.writer(), "{} ({})", path.display(), change)?;
        }
        writeln!(self.writer())?;

        self.print_file_section("Untracked Files", &status.untracked_files)
    }

    fn print_branches(&self, status: &StatusInfo) -> anyhow::Result<()> {
        writeln!(self.writer(), "=== Branches ===")?;
        for branch in &status.branches {
            let marker = match status.current_branch.as_ref() == Some(branch) {
                true => "*",
                false => "",
            };
            writeln!(self.writer(), "{marker}{branch}")?;
        }
        writeln!(self.writer())?;

        Ok(())
    }

    fn print_file_section(&self, title: &str, files: &FileSet) -> anyhow::Result<()> {
        writeln!(self.writer(), "=== {title} ===")?;
        for file in files {
            writeln!(self.writer(), "{}", file.display())?;
        }
        writeln!(self.writer())?;

        Ok(())
    }
}
