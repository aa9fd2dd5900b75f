use assert_fs::TempDir;
use common::command::{get_head_commit_id, init_repository_dir, repository_dir, run_sprig_command};
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn init_creates_the_repository_layout(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_sprig_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout("")
        .stderr("");

    let sprig_dir = repository_dir.path().join(".sprig");
    assert!(sprig_dir.join("commits").is_dir());
    assert!(sprig_dir.join("blobs").is_dir());
    assert!(sprig_dir.join("refs").join("heads").is_dir());
    assert!(sprig_dir.join("index").is_file());
    assert_eq!(
        std::fs::read_to_string(sprig_dir.join("HEAD"))?,
        "ref: refs/heads/master"
    );

    let root_commit = get_head_commit_id(repository_dir.path());
    assert_eq!(root_commit.len(), 40);
    assert!(root_commit.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(
        sprig_dir
            .join("commits")
            .join(&root_commit[..2])
            .join(&root_commit)
            .is_file()
    );

    Ok(())
}

#[rstest]
fn every_repository_starts_from_the_same_root_commit(
    #[from(init_repository_dir)] first: TempDir,
    #[from(init_repository_dir)] second: TempDir,
) {
    assert_eq!(
        get_head_commit_id(first.path()),
        get_head_commit_id(second.path())
    );
}

#[rstest]
fn init_twice_is_refused(init_repository_dir: TempDir) {
    let head_before = get_head_commit_id(init_repository_dir.path());

    run_sprig_command(init_repository_dir.path(), &["init"])
        .assert()
        .success()
        .stderr("A sprig repository already exists in the current directory.\n");

    assert_eq!(get_head_commit_id(init_repository_dir.path()), head_before);
}

#[rstest]
#[case::status(&["status"])]
#[case::log(&["log"])]
#[case::add(&["add", "file.txt"])]
#[case::branch(&["branch", "feature"])]
fn commands_outside_a_repository_are_refused(repository_dir: TempDir, #[case] args: &[&str]) {
    run_sprig_command(repository_dir.path(), args)
        .assert()
        .success()
        .stdout("")
        .stderr("Not in an initialized sprig directory.\n");

    assert!(!repository_dir.path().join(".sprig").exists());
}

#[rstest]
fn a_missing_command_is_reported(repository_dir: TempDir) {
    run_sprig_command(repository_dir.path(), &[])
        .assert()
        .success()
        .stderr("Please enter a command.\n");
}

#[rstest]
fn an_unknown_command_is_reported(init_repository_dir: TempDir) {
    run_sprig_command(init_repository_dir.path(), &["push"])
        .assert()
        .success()
        .stderr("No command with that name exists.\n");
}

#[rstest]
#[case::add_without_file(&["add"])]
#[case::add_with_two_files(&["add", "a.txt", "b.txt"])]
#[case::log_with_operand(&["log", "master"])]
#[case::init_with_operand(&["init", "somewhere"])]
#[case::checkout_without_operand(&["checkout"])]
#[case::checkout_with_two_files(&["checkout", "--", "a.txt", "b.txt"])]
#[case::merge_without_branch(&["merge"])]
fn wrong_operands_are_reported(init_repository_dir: TempDir, #[case] args: &[&str]) {
    run_sprig_command(init_repository_dir.path(), args)
        .assert()
        .success()
        .stderr(predicate::eq("Incorrect operands.\n"));
}
