use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

/// Commit date used unless a test pins its own
pub const DEFAULT_COMMIT_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_sprig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

/// A repository with `1.txt`, `a/2.txt` and `a/b/3.txt` committed on master
#[fixture]
pub fn committed_repository_dir(init_repository_dir: TempDir) -> TempDir {
    commit_files(
        init_repository_dir.path(),
        &[("1.txt", "one"), ("a/2.txt", "two"), ("a/b/3.txt", "three")],
        "Initial files",
    );

    init_repository_dir
}

pub fn run_sprig_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("sprig").expect("Failed to find sprig binary");
    cmd.envs(vec![("NO_PAGER", "1"), ("TZ", "UTC")]);
    cmd.env_remove("SPRIG_COMMIT_DATE");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn sprig_commit(dir: &Path, message: &str) -> Command {
    sprig_commit_at(dir, message, DEFAULT_COMMIT_DATE)
}

pub fn sprig_commit_at(dir: &Path, message: &str, date: &str) -> Command {
    let mut cmd = run_sprig_command(dir, &["commit", message]);
    cmd.env("SPRIG_COMMIT_DATE", date); // %Y-%m-%d %H:%M:%S %z
    cmd
}

/// Write, stage and commit the given files
pub fn commit_files(dir: &Path, files: &[(&str, &str)], message: &str) {
    commit_files_at(dir, files, message, DEFAULT_COMMIT_DATE);
}

pub fn commit_files_at(dir: &Path, files: &[(&str, &str)], message: &str, date: &str) {
    for (path, content) in files {
        write_file(FileSpec::new(dir.join(path), content.to_string()));
        run_sprig_command(dir, &["add", path]).assert().success();
    }

    sprig_commit_at(dir, message, date)
        .assert()
        .success()
        .stderr("");
}

/// Stdout of a command that is expected to succeed
pub fn stdout_of(mut cmd: Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("stdout is not valid UTF-8")
}

/// Paths listed under "Staged Files" by `status`
pub fn staged_files(dir: &Path) -> Vec<String> {
    let status = stdout_of(run_sprig_command(dir, &["status"]));

    status
        .split("=== Staged Files ===\n")
        .nth(1)
        .map(|rest| {
            rest.lines()
                .take_while(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// The commit id HEAD resolves to
pub fn get_head_commit_id(dir: &Path) -> String {
    let repository_path = dir.join(".sprig");
    let head_content =
        std::fs::read_to_string(repository_path.join("HEAD")).expect("Failed to read HEAD");

    match head_content.trim().strip_prefix("ref: ") {
        Some(ref_path) => std::fs::read_to_string(repository_path.join(ref_path))
            .expect("Failed to read the current branch")
            .trim()
            .to_string(),
        None => head_content.trim().to_string(),
    }
}

pub fn get_branch_commit_id(dir: &Path, branch: &str) -> String {
    std::fs::read_to_string(dir.join(".sprig").join("refs").join("heads").join(branch))
        .expect("Failed to read branch")
        .trim()
        .to_string()
}
