//! Three-way resolution of a single path
//!
//! Every path of the split point, the current tip and the given tip is
//! compared by blob id; an absent version is `None`.

use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use bytes::{BufMut, Bytes, BytesMut};
use std::collections::BTreeSet;
use std::path::PathBuf;

const CONFLICT_START: &str = "<<<<<<< HEAD\n";
const CONFLICT_SEPARATOR: &str = "=======\n";
const CONFLICT_END: &str = ">>>>>>>\n";

/// What the merge does with one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Leave the current version (or its absence) in place
    KeepCurrent,
    /// Write the given version and stage it
    TakeGiven(ObjectId),
    /// Delete the working file and stage its removal
    Remove,
    /// Both sides changed the path differently
    Conflict {
        current: Option<ObjectId>,
        given: Option<ObjectId>,
    },
}

/// Resolve one path from its split, current and given versions
pub fn resolve(
    split: Option<&ObjectId>,
    current: Option<&ObjectId>,
    given: Option<&ObjectId>,
) -> Resolution {
    if current == given || split == given {
        return Resolution::KeepCurrent;
    }

    if split == current {
        return match given {
            Some(given) => Resolution::TakeGiven(given.clone()),
            None => Resolution::Remove,
        };
    }

    Resolution::Conflict {
        current: current.cloned(),
        given: given.cloned(),
    }
}

/// Every path known to at least one of the three snapshots, sorted
pub fn path_universe(split: &Snapshot, current: &Snapshot, given: &Snapshot) -> BTreeSet<PathBuf> {
    split
        .keys()
        .chain(current.keys())
        .chain(given.keys())
        .cloned()
        .collect()
}

/// File contents recorded for a conflicted path; a missing side is empty
pub fn conflict_content(current: Option<&[u8]>, given: Option<&[u8]>) -> Bytes {
    let current = current.unwrap_or_default();
    let given = given.unwrap_or_default();

    let mut content = BytesMut::with_capacity(
        CONFLICT_START.len()
            + current.len()
            + CONFLICT_SEPARATOR.len()
            + given.len()
            + CONFLICT_END.len(),
    );
    content.put_slice(CONFLICT_START.as_bytes());
    content.put_slice(current);
    content.put_slice(CONFLICT_SEPARATOR.as_bytes());
    content.put_slice(given);
    content.put_slice(CONFLICT_END.as_bytes());

    content.freeze()
}
