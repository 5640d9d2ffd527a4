//! End-to-end tests against a real throwaway repository.
//!
//! Each test builds its own repo under a tempdir with the git binary, then
//! drives the public `Git` API against it. All tests bail out early when git
//! is not installed.

use std::fs;
use std::path::Path;
use std::process::Command;

use blameline::{Git, GitError};
use pretty_assertions::assert_eq;
use regex::Regex;
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// `git init` plus the identity config commits need.
fn init_repo(dir: &Path) {
    git(dir, &["init"]);
    git(dir, &["config", "user.name", "Jon Doe"]);
    git(dir, &["config", "user.email", "jon@example.com"]);
}

fn commit_file(dir: &Path, name: &str, contents: &str, message: &str) {
    fs::write(dir.join(name), contents).expect("write file");
    git(dir, &["add", name]);
    git(dir, &["commit", "-m", message]);
}

#[test]
fn test_blame_attributes_every_line() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let repo = TempDir::new().expect("create repo dir");
    init_repo(repo.path());
    commit_file(repo.path(), "test.txt", "first\nsecond\n", "Initial commit");

    let mut git = Git::new();
    git.set_repository(repo.path());
    let records = git.blame("test.txt", None).expect("blame succeeds");

    assert_eq!(records.len(), 2);

    let numbers: Vec<u32> = records.iter().map(|r| r.line_number).collect();
    assert_eq!(numbers, vec![1, 2]);

    let contents: Vec<&str> = records.iter().map(|r| r.line_content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second"]);

    let timestamp_shape = Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} [+-]\d{4}$").unwrap();
    for record in &records {
        assert_eq!(record.author_name, "Jon Doe");
        assert_eq!(record.commit_hash.len(), 40);
        assert!(record.commit_hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(
            timestamp_shape.is_match(&record.author_timestamp),
            "unexpected timestamp shape: {}",
            record.author_timestamp
        );
    }
}

#[test]
fn test_blame_at_a_past_revision() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let repo = TempDir::new().expect("create repo dir");
    init_repo(repo.path());
    commit_file(repo.path(), "test.txt", "original\n", "Initial commit");
    let first_commit = git(repo.path(), &["rev-parse", "HEAD"]).trim().to_string();
    commit_file(repo.path(), "test.txt", "rewritten\n", "Rewrite the line");

    let mut git = Git::new();
    git.set_repository(repo.path());

    let head = git.blame("test.txt", None).expect("blame at head");
    assert_eq!(head[0].line_content, "rewritten");

    let old = git
        .blame("test.txt", Some(&first_commit))
        .expect("blame at first commit");
    assert_eq!(old.len(), 1);
    assert_eq!(old[0].line_content, "original");
    assert_eq!(old[0].commit_hash, first_commit);
}

#[test]
fn test_blame_empty_file_yields_no_records() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let repo = TempDir::new().expect("create repo dir");
    init_repo(repo.path());
    commit_file(repo.path(), "empty.txt", "", "Add empty file");

    let mut git = Git::new();
    git.set_repository(repo.path());
    let records = git.blame("empty.txt", None).expect("blame succeeds");
    assert_eq!(records, vec![]);
}

#[test]
fn test_blame_missing_file_is_a_process_error() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let repo = TempDir::new().expect("create repo dir");
    init_repo(repo.path());
    commit_file(repo.path(), "test.txt", "line\n", "Initial commit");

    let mut git = Git::new();
    git.set_repository(repo.path());
    let err = git.blame("no-such-file.txt", None).unwrap_err();

    match err {
        GitError::Process {
            command,
            exit_code,
            stderr,
        } => {
            assert!(command.contains("blame --line-porcelain"));
            assert!(exit_code.is_some());
            assert!(!stderr.is_empty());
        }
        other => panic!("expected Process error, got {other:?}"),
    }
}

#[test]
fn test_version_reports_the_binary() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let git = Git::new();
    let version = git.version().expect("version succeeds");
    assert!(version.starts_with("git version"), "got: {version}");
}
