use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::HashSet;

/// Depth-first walk over a commit and all of its ancestors
///
/// Each commit is yielded once. First parents are explored before second
/// parents. The loader decides where commits come from, so the walk works
/// the same over the object store and over an in-memory graph.
pub struct Ancestors<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    commit_loader: CommitLoaderFn,
    stack: Vec<ObjectId>,
    visited: HashSet<ObjectId>,
}

impl<CommitLoaderFn> Ancestors<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    pub fn new(commit_loader: CommitLoaderFn, start: ObjectId) -> Self {
        Self {
            commit_loader,
            stack: vec![start],
            visited: HashSet::new(),
        }
    }
}

impl<CommitLoaderFn> Iterator for Ancestors<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    type Item = anyhow::Result<SlimCommit>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(commit_oid) = self.stack.pop() {
            if !self.visited.insert(commit_oid.clone()) {
                continue;
            }

            return match (self.commit_loader)(&commit_oid) {
                Ok(commit) => {
                    self.stack.extend(
                        commit
                            .parents
                            .iter()
                            .rev()
                            .filter(|parent| !self.visited.contains(*parent))
                            .cloned(),
                    );
                    Some(Ok(commit))
                }
                Err(error) => {
                    self.stack.clear();
                    Some(Err(error))
                }
            };
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn oid(name: &str) -> ObjectId {
        ObjectId::digest([name])
    }

    fn graph(edges: &[(&str, &[&str])]) -> HashMap<ObjectId, SlimCommit> {
        edges
            .iter()
            .map(|(name, parents)| {
                let commit = SlimCommit {
                    oid: oid(name),
                    parents: parents.iter().map(|parent| oid(parent)).collect(),
                };
                (oid(name), commit)
            })
            .collect()
    }

    #[test]
    fn visits_each_ancestor_once_first_parent_first() {
        //   a
        //  / \
        // b   c
        //  \ /
        //   d
        let commits = graph(&[("a", &[]), ("b", &["a"]), ("c", &["a"]), ("d", &["b", "c"])]);
        let loader = |id: &ObjectId| {
            commits
                .get(id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("missing {id}"))
        };

        let order = Ancestors::new(loader, oid("d"))
            .map(|commit| commit.unwrap().oid)
            .collect::<Vec<_>>();

        assert_eq!(order, vec![oid("d"), oid("b"), oid("a"), oid("c")]);
    }

    #[test]
    fn loader_failures_end_the_walk() {
        let commits = graph(&[("b", &["missing"])]);
        let loader = |id: &ObjectId| {
            commits
                .get(id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("missing {id}"))
        };

        let results = Ancestors::new(loader, oid("b")).collect::<Vec<_>>();

        assert_eq!(results.len(), 2);
        assert!(results[1].is_err());
    }
}
