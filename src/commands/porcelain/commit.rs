use crate::areas::repository::Repository;
use crate::errors::RepositoryError;

impl Repository {
    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        let message = strip_quotes(message);
        if message.is_empty() {
            return Err(RepositoryError::invalid_state(
                "Please enter a commit message.",
            ));
        }

        if self.index().is_empty() {
            return Err(RepositoryError::invalid_state(
                "No changes added to the commit.",
            ));
        }

        let parent = self.refs().read_head()?;
        self.write_commit(vec![parent], message)?;

        Ok(())
    }
}

// shells on some platforms hand the quotes over verbatim
fn strip_quotes(message: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|quote| {
            message
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        })
        .unwrap_or(message)
}
