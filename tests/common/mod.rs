#![allow(dead_code)]

pub mod command;
pub mod file;

/// Log entry of the commit every repository starts from
pub fn initial_commit_entry(commit_id: &str) -> String {
    format!("===\ncommit {commit_id}\nDate: Thu Jan 1 00:00:00 1970 +0000\ninitial commit\n\n")
}
