//! Best common ancestor (split point) search
//!
//! The split point of two commits is the commit a three-way merge compares
//! both sides against.
//!
//! ## Algorithm Overview
//!
//! ### Phase 1: Breadth-first walk from both tips
//!
//! A single FIFO queue holds entries from both sides. Each commit records which
//! side(s) reached it and its shortest distance from each tip. Since queued
//! distances never decrease, the first time a side reaches a commit is the
//! shortest.
//!
//! ### Phase 2: Filter to best common ancestors
//!
//! > A best common ancestor of X and Y is any common ancestor of X and Y
//! > that is not an ancestor of any other common ancestor.
//!
//! Every proper ancestor of a common ancestor is redundant.
//!
//! ### Phase 3: Tie-break
//!
//! Among the best common ancestors the minimum by (distance from the first
//! tip, distance from the second tip, id) wins, so the result is deterministic.
//!
//! ## Debug Logging
//!
//! Build with `--features debug_merge` to trace the search on stderr.

use crate::artifacts::log::ancestors::Ancestors;
use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use bitflags::bitflags;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Macro for debug logging that is enabled with the debug_merge feature flag
///
/// # Usage
/// ```rust,ignore
/// debug_log!("Processing commit {}", commit_id);
/// ```
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_merge")]
        {
            eprintln!($($arg)*);
        }
    };
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const NONE = 0b00;
        const VISITED_FROM_SOURCE = 0b01;
        const VISITED_FROM_TARGET = 0b10;
        const VISITED_FROM_BOTH = Self::VISITED_FROM_SOURCE.bits() | Self::VISITED_FROM_TARGET.bits();
    }
}

impl fmt::Debug for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(VisitState::VISITED_FROM_SOURCE) {
            flags.push("SOURCE");
        }
        if self.contains(VisitState::VISITED_FROM_TARGET) {
            flags.push("TARGET");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What the breadth-first walk learned about one commit
#[derive(Debug, Clone, Copy)]
struct AncestorState {
    visited: VisitState,
    distance_from_source: usize,
    distance_from_target: usize,
}

impl Default for AncestorState {
    fn default() -> Self {
        Self {
            visited: VisitState::NONE,
            distance_from_source: usize::MAX,
            distance_from_target: usize::MAX,
        }
    }
}

impl AncestorState {
    fn record(&mut self, side: VisitState, distance: usize) {
        self.visited |= side;
        if side == VisitState::VISITED_FROM_SOURCE {
            self.distance_from_source = distance;
        } else {
            self.distance_from_target = distance;
        }
    }
}

/// Finds the best common ancestor of two commits
///
/// # Type Parameters
///
/// * `CommitLoaderFn` - A function that takes an ObjectId reference and returns
///   the commit's parents, or fails when the commit is unknown.
pub struct BCAFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> BCAFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    /// # Example
    ///
    /// ```rust,ignore
    /// let finder = BCAFinder::new(|commit_id| database.parse_slim_commit(commit_id));
    /// ```
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// Finds the best common ancestor between two commits
    ///
    /// # Returns
    ///
    /// - the split point; `source` itself when `source` is an ancestor of
    ///   `target` (and the other way round)
    /// - `NotFound` when the histories share no commit
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// // Branched history:
    /// //     A
    /// //    / \
    /// //   B   C
    /// let bca = finder.find_best_common_ancestor(&b, &c)?;
    /// assert_eq!(bca, a);
    /// ```
    pub fn find_best_common_ancestor(
        &self,
        source_commit_id: &ObjectId,
        target_commit_id: &ObjectId,
    ) -> anyhow::Result<ObjectId> {
        if source_commit_id == target_commit_id {
            return Ok(source_commit_id.clone());
        }

        let states = self.walk_from_both_tips(source_commit_id, target_commit_id)?;
        let common_ancestors = states
            .iter()
            .filter(|(_, state)| state.visited.contains(VisitState::VISITED_FROM_BOTH))
            .map(|(oid, _)| oid.clone())
            .collect::<HashSet<_>>();

        if common_ancestors.is_empty() {
            return Err(RepositoryError::not_found(format!(
                "Commits {source_commit_id} and {target_commit_id} share no history."
            )));
        }

        debug_log!(
            "Found common ancestors: {}",
            common_ancestors
                .iter()
                .map(|oid| oid.as_ref())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let redundant_ancestors = self.redundant_ancestors(&common_ancestors)?;

        debug_log!(
            "Redundant ancestors: {}",
            redundant_ancestors
                .iter()
                .map(|oid| oid.as_ref())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let best_common_ancestor = common_ancestors
            .into_iter()
            .filter(|commit| !redundant_ancestors.contains(commit))
            .min_by(|left, right| {
                let left_state = &states[left];
                let right_state = &states[right];

                (left_state.distance_from_source, left_state.distance_from_target, left).cmp(&(
                    right_state.distance_from_source,
                    right_state.distance_from_target,
                    right,
                ))
            });

        debug_log!("Best common ancestor: {:?}", best_common_ancestor);

        // a common ancestor always survives the filter: the ones that are
        // ancestors of no other common ancestor
        best_common_ancestor.ok_or_else(|| {
            RepositoryError::not_found(format!(
                "Commits {source_commit_id} and {target_commit_id} share no history."
            ))
        })
    }

    fn walk_from_both_tips(
        &self,
        source_commit_id: &ObjectId,
        target_commit_id: &ObjectId,
    ) -> anyhow::Result<HashMap<ObjectId, AncestorState>> {
        let mut ancestors_states = HashMap::<ObjectId, AncestorState>::new();
        let mut queue = VecDeque::from([
            (source_commit_id.clone(), VisitState::VISITED_FROM_SOURCE, 0),
            (target_commit_id.clone(), VisitState::VISITED_FROM_TARGET, 0),
        ]);

        while let Some((commit_id, side, distance)) = queue.pop_front() {
            let state = ancestors_states.entry(commit_id.clone()).or_default();
            if state.visited.contains(side) {
                continue;
            }
            state.record(side, distance);

            debug_log!(
                "Processing commit {}: state={} distance={}",
                &commit_id,
                state.visited,
                distance
            );

            let commit = (self.commit_loader)(&commit_id)?;
            for parent_id in commit.parents {
                let already_reached = ancestors_states
                    .get(&parent_id)
                    .is_some_and(|parent_state| parent_state.visited.contains(side));

                if !already_reached {
                    queue.push_back((parent_id, side, distance + 1));
                }
            }
        }

        Ok(ancestors_states)
    }

    /// Common ancestors reachable from another common ancestor
    fn redundant_ancestors(
        &self,
        common_ancestors: &HashSet<ObjectId>,
    ) -> anyhow::Result<HashSet<ObjectId>> {
        let mut redundant_ancestors = HashSet::<ObjectId>::new();

        for commit_id in common_ancestors {
            if redundant_ancestors.contains(commit_id) {
                // its ancestors were already marked from a descendant
                continue;
            }

            for ancestor in Ancestors::new(&self.commit_loader, commit_id.clone()).skip(1) {
                let ancestor = ancestor?;
                if common_ancestors.contains(&ancestor.oid) {
                    redundant_ancestors.insert(ancestor.oid);
                }
            }
        }

        Ok(redundant_ancestors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    /// In-memory commit store for testing
    #[derive(Debug, Clone, Default)]
    struct InMemoryCommitStore {
        commits: HashMap<ObjectId, SlimCommit>,
    }

    impl InMemoryCommitStore {
        fn add_commit(&mut self, commit_id: ObjectId, parents: Vec<ObjectId>) {
            self.commits.insert(
                commit_id.clone(),
                SlimCommit {
                    oid: commit_id,
                    parents,
                },
            );
        }

        fn get_slim_commit(&self, commit_id: &ObjectId) -> anyhow::Result<SlimCommit> {
            self.commits
                .get(commit_id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Commit {commit_id} not found in test store"))
        }

        fn finder(&self) -> BCAFinder<impl Fn(&ObjectId) -> anyhow::Result<SlimCommit> + '_> {
            BCAFinder::new(|oid: &ObjectId| self.get_slim_commit(oid))
        }
    }

    /// Deterministic 40-character hex ObjectId spelling out `id`
    fn create_oid(id: &str) -> ObjectId {
        let mut hex_string = id
            .as_bytes()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect::<String>();

        while hex_string.len() < 40 {
            hex_string.push('0');
        }
        hex_string.truncate(40);

        ObjectId::try_parse(hex_string).expect("Invalid test ObjectId")
    }

    fn store_from(edges: &[(&str, &[&str])]) -> InMemoryCommitStore {
        let mut store = InMemoryCommitStore::default();
        for (commit, parents) in edges {
            store.add_commit(
                create_oid(commit),
                parents.iter().map(|parent| create_oid(parent)).collect(),
            );
        }
        store
    }

    #[fixture]
    fn linear_history() -> InMemoryCommitStore {
        // A <- B <- C <- D
        store_from(&[("a", &[]), ("b", &["a"]), ("c", &["b"]), ("d", &["c"])])
    }

    #[fixture]
    fn simple_merge() -> InMemoryCommitStore {
        //     A
        //    / \
        //   B   C
        //    \ /
        //     D (merge commit)
        store_from(&[("a", &[]), ("b", &["a"]), ("c", &["a"]), ("d", &["b", "c"])])
    }

    #[fixture]
    fn criss_cross_merge() -> InMemoryCommitStore {
        //     A
        //    / \
        //   B   C
        //   |\ /|
        //   | X |
        //   |/ \|
        //   D   E
        //   |   |
        //   F   G
        store_from(&[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &["a"]),
            ("d", &["b", "c"]),
            ("e", &["c", "b"]),
            ("f", &["d"]),
            ("g", &["e"]),
        ])
    }

    #[fixture]
    fn diamond_pattern() -> InMemoryCommitStore {
        //     A
        //    /|\
        //   B C D
        //   |X| |
        //   E F G
        store_from(&[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &["a"]),
            ("d", &["a"]),
            ("e", &["b", "c"]),
            ("f", &["c", "d"]),
            ("g", &["d"]),
        ])
    }

    #[rstest]
    fn a_commit_is_its_own_split_point(linear_history: InMemoryCommitStore) {
        let c = create_oid("c");

        assert_eq!(
            linear_history.finder().find_best_common_ancestor(&c, &c).unwrap(),
            c
        );
    }

    #[rstest]
    fn the_root_is_the_split_point_with_any_descendant(linear_history: InMemoryCommitStore) {
        let a = create_oid("a");
        let d = create_oid("d");
        let finder = linear_history.finder();

        assert_eq!(finder.find_best_common_ancestor(&a, &d).unwrap(), a);
        assert_eq!(finder.find_best_common_ancestor(&d, &a).unwrap(), a);
    }

    #[rstest]
    fn an_ancestor_is_the_split_point_with_its_descendant(linear_history: InMemoryCommitStore) {
        let b = create_oid("b");
        let d = create_oid("d");

        assert_eq!(linear_history.finder().find_best_common_ancestor(&b, &d).unwrap(), b);
    }

    #[rstest]
    fn siblings_split_at_their_parent(simple_merge: InMemoryCommitStore) {
        let a = create_oid("a");
        let finder = simple_merge.finder();

        assert_eq!(
            finder
                .find_best_common_ancestor(&create_oid("b"), &create_oid("c"))
                .unwrap(),
            a
        );
    }

    #[rstest]
    fn a_merge_commit_contains_both_of_its_parents(simple_merge: InMemoryCommitStore) {
        let c = create_oid("c");
        let d = create_oid("d");
        let finder = simple_merge.finder();

        assert_eq!(finder.find_best_common_ancestor(&d, &c).unwrap(), c);
        assert_eq!(finder.find_best_common_ancestor(&c, &d).unwrap(), c);
    }

    #[rstest]
    fn criss_cross_picks_a_best_common_ancestor_deterministically(
        criss_cross_merge: InMemoryCommitStore,
    ) {
        let finder = criss_cross_merge.finder();
        let b = create_oid("b");

        // B and C are both best common ancestors at equal distances; the
        // smaller id wins, and A (an ancestor of both) is never picked
        let ancestor = finder
            .find_best_common_ancestor(&create_oid("f"), &create_oid("g"))
            .unwrap();
        assert_eq!(ancestor, b);

        let ancestor = finder
            .find_best_common_ancestor(&create_oid("g"), &create_oid("f"))
            .unwrap();
        assert_eq!(ancestor, b);
    }

    #[rstest]
    fn merge_commits_share_both_criss_cross_parents(criss_cross_merge: InMemoryCommitStore) {
        // E and D both reach B and C in one step
        let finder = criss_cross_merge.finder();

        assert_eq!(
            finder
                .find_best_common_ancestor(&create_oid("e"), &create_oid("d"))
                .unwrap(),
            create_oid("b")
        );
    }

    #[rstest]
    fn diamond_split_is_the_shared_middle_commit(diamond_pattern: InMemoryCommitStore) {
        let finder = diamond_pattern.finder();

        assert_eq!(
            finder
                .find_best_common_ancestor(&create_oid("e"), &create_oid("f"))
                .unwrap(),
            create_oid("c")
        );
        assert_eq!(
            finder
                .find_best_common_ancestor(&create_oid("e"), &create_oid("g"))
                .unwrap(),
            create_oid("a")
        );
    }

    #[test]
    fn closer_best_ancestor_wins_over_a_smaller_id() {
        //   a
        //  / \
        // b   c
        // |\ /|
        // | X |
        // |/ \|
        // x   d
        //     |
        //     y
        // b and c are both best common ancestors of x and y. From x both are
        // one step away; from y, c is one step away through the second parent
        // and b is two.
        let store = store_from(&[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &["a"]),
            ("x", &["b", "c"]),
            ("d", &["b"]),
            ("y", &["d", "c"]),
        ]);

        assert_eq!(
            store
                .finder()
                .find_best_common_ancestor(&create_oid("x"), &create_oid("y"))
                .unwrap(),
            create_oid("c")
        );
    }

    #[test]
    fn disjoint_histories_have_no_split_point() {
        let store = store_from(&[("a", &[]), ("b", &["a"]), ("x", &[]), ("y", &["x"])]);

        let error = store
            .finder()
            .find_best_common_ancestor(&create_oid("b"), &create_oid("y"))
            .unwrap_err();

        assert!(matches!(
            error.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::NotFound(_))
        ));
    }

    #[test]
    fn unknown_commits_fail_the_search() {
        let store = store_from(&[("a", &[])]);

        assert!(
            store
                .finder()
                .find_best_common_ancestor(&create_oid("a"), &create_oid("zz"))
                .is_err()
        );
    }
}
