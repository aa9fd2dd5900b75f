//! Commit object
//!
//! Commits record a full snapshot of the tracked files together with a
//! message, a timestamp and the links to their parents:
//! - no parent for the root commit
//! - one parent for an ordinary commit
//! - two parents for a merge commit
//!
//! The identity of a commit covers the message, the timestamp and the
//! snapshot, but not the parents.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! timestamp <seconds since epoch>
//! parent <parent-sha>
//! entry <blob-sha> <path>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Tracked files of a commit: path relative to the working tree root -> blob id
pub type Snapshot = BTreeMap<PathBuf, ObjectId>;

/// Environment variable pinning the timestamp of new commits
pub const COMMIT_DATE_ENV: &str = "SPRIG_COMMIT_DATE";

/// Timestamp for a new commit
///
/// Reads `SPRIG_COMMIT_DATE` (RFC 2822 or `%Y-%m-%d %H:%M:%S %z`) and falls
/// back to the current time when it is unset or unparsable.
pub fn commit_timestamp_from_env() -> i64 {
    std::env::var(COMMIT_DATE_ENV)
        .ok()
        .and_then(|date_str| {
            chrono::DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| chrono::DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        })
        .map(|timestamp| timestamp.timestamp())
        .unwrap_or_else(|| chrono::Utc::now().timestamp())
}

/// Whether `path` survives the line-oriented commit record: valid UTF-8
/// without line breaks
pub fn is_recordable_path(path: &Path) -> bool {
    path.to_str()
        .is_some_and(|path| !path.contains(['\n', '\r']))
}

/// Slim representation of a commit
///
/// Contains only what graph walks need: the split point search and the
/// history listings never look at snapshots.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    pub oid: ObjectId,
    pub parents: Vec<ObjectId>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    message: String,
    /// Seconds since the Unix epoch
    timestamp: i64,
    /// First parent, then the merged-in parent for merge commits
    parents: Vec<ObjectId>,
    snapshot: Snapshot,
}

impl Commit {
    pub fn new(message: String, timestamp: i64, parents: Vec<ObjectId>, snapshot: Snapshot) -> Self {
        Commit {
            message,
            timestamp,
            parents,
            snapshot,
        }
    }

    /// The commit every repository starts from
    pub fn root() -> Self {
        Commit::new("initial commit".to_string(), 0, vec![], Snapshot::new())
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn second_parent(&self) -> Option<&ObjectId> {
        self.parents.get(1)
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn tracks(&self, path: &Path) -> bool {
        self.snapshot.contains_key(path)
    }

    pub fn blob_for(&self, path: &Path) -> Option<&ObjectId> {
        self.snapshot.get(path)
    }

    pub fn to_slim(&self, oid: ObjectId) -> SlimCommit {
        SlimCommit {
            oid,
            parents: self.parents.clone(),
        }
    }

    /// Format timestamp in human-readable form, in the local time zone
    ///
    /// # Returns
    ///
    /// String like "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        chrono::DateTime::from_timestamp(self.timestamp, 0)
            .unwrap_or_default()
            .with_timezone(&chrono::Local)
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(Bytes::from(self.display()))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let (header, message) = content
            .split_once("\n\n")
            .context("Invalid commit object: missing message separator")?;
        let mut lines = header.lines();

        let timestamp = lines
            .next()
            .and_then(|line| line.strip_prefix("timestamp "))
            .context("Invalid commit object: missing timestamp line")?
            .parse::<i64>()
            .context("Invalid commit object: invalid timestamp")?;

        let mut parents = Vec::new();
        let mut snapshot = Snapshot::new();
        for line in lines {
            if let Some(parent) = line.strip_prefix("parent ") {
                parents.push(ObjectId::try_parse(parent.to_string())?);
            } else if let Some(entry) = line.strip_prefix("entry ") {
                let (oid, path) = entry
                    .split_once(' ')
                    .context("Invalid commit object: invalid entry line")?;
                snapshot.insert(PathBuf::from(path), ObjectId::try_parse(oid.to_string())?);
            } else {
                anyhow::bail!("Invalid commit object: unexpected line {line:?}");
            }
        }

        Ok(Self::new(message.to_string(), timestamp, parents, snapshot))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let mut lines = vec![format!("timestamp {}", self.timestamp)];

        for parent in &self.parents {
            lines.push(format!("parent {parent}"));
        }
        for (path, oid) in &self.snapshot {
            lines.push(format!("entry {oid} {}", path.display()));
        }
        lines.push(String::new());
        lines.push(self.message.clone());

        lines.join("\n")
    }

    fn object_id(&self) -> anyhow::Result<ObjectId> {
        // paths are length-prefixed so that `:` and `;` in names stay unambiguous
        let snapshot = self
            .snapshot
            .iter()
            .map(|(path, oid)| {
                let path = path.to_string_lossy();
                format!("{}:{path}:{oid};", path.len())
            })
            .collect::<String>();

        Ok(ObjectId::digest([
            self.message.as_str(),
            &self.timestamp.to_string(),
            &snapshot,
        ]))
    }
}
