use assert_cmd::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str]) {
    assert!(Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn git_at(dir: &Path, args: &[&str], date: &str) {
    assert!(Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_DATE", date)
        .env("GIT_COMMITTER_DATE", date)
        .status()
        .unwrap()
        .success());
}

fn rev_parse(dir: &Path, rev: &str) -> String {
    let out = Command::new("git")
        .args(["rev-parse", rev])
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(out.status.success());
    String::from_utf8(out.stdout).unwrap().trim().to_string()
}

fn init_git_repo(dir: &Path, author: &str) {
    git(dir, &["init"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(dir, &["config", "core.autocrlf", "false"]);
    git(dir, &["config", "core.safecrlf", "false"]);
    git(dir, &["config", "user.email", "author@example.com"]);
    git(dir, &["config", "user.name", author]);
}

fn write_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.sync_all().unwrap();
}

fn commit_all(dir: &Path, message: &str, date: &str) {
    git(dir, &["add", "-A"]);
    git_at(dir, &["commit", "-m", message], date);
}

/// Root commit plus three single-parent commits by Alice:
/// `a.py` +2, `b.txt` +4 (not counted), `c.js` -3.
fn alice_repo() -> TempDir {
    let dir = tempdir().unwrap();
    let p = dir.path();
    init_git_repo(p, "Alice");

    write_file(p, "README.md", "# demo\n");
    write_file(p, "c.js", "one();\ntwo();\nthree();\n");
    commit_all(p, "initial", "2024-01-01T10:00:00Z");

    write_file(p, "a.py", "x = 1\ny = 2\n");
    commit_all(p, "add a.py", "2024-02-01T10:00:00Z");

    write_file(p, "b.txt", "1\n2\n3\n4\n");
    commit_all(p, "add b.txt", "2024-02-02T10:00:00Z");

    git(p, &["rm", "-q", "c.js"]);
    commit_all(p, "remove c.js", "2024-02-03T10:00:00Z");

    dir
}

fn authorstat(repo: &Path, workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("authorstat").unwrap();
    cmd.current_dir(workdir)
        .env_remove("GITHUB_TOKEN")
        .env_remove("AUTHORSTAT_LOG")
        .arg("--repo-url")
        .arg(repo);
    cmd
}

/// Rows printed after the separator line.
fn table_rows(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip_while(|l| !l.starts_with("-----"))
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[test]
fn counts_lines_per_author_over_a_date_range() {
    if !has_git() {
        return;
    }
    let repo = alice_repo();
    let work = tempdir().unwrap();

    let out = authorstat(repo.path(), work.path())
        .args(["--since", "2024-01-01", "--until", "2024-12-31"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();

    assert!(stdout.contains("User                 |    Add | Delete |  Total"));
    assert_eq!(
        table_rows(&stdout),
        vec!["Alice                |      2 |      3 |      5".to_string()]
    );
}

#[test]
fn date_window_excludes_commits_outside_it() {
    if !has_git() {
        return;
    }
    let repo = alice_repo();
    let work = tempdir().unwrap();

    // only the a.py commit falls on 2024-02-01
    let out = authorstat(repo.path(), work.path())
        .args(["--since", "2024-02-01", "--until", "2024-02-01"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();

    assert_eq!(
        table_rows(&stdout),
        vec!["Alice                |      2 |      0 |      2".to_string()]
    );
}

#[test]
fn merge_commit_yields_header_only() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    let p = dir.path();
    init_git_repo(p, "Alice");

    write_file(p, "base.py", "a\n");
    commit_all(p, "base", "2024-03-01T10:00:00Z");

    git(p, &["checkout", "-q", "-b", "feat"]);
    write_file(p, "feat.py", "f1\nf2\n");
    commit_all(p, "feature", "2024-03-02T10:00:00Z");

    git(p, &["checkout", "-q", "main"]);
    write_file(p, "base.py", "a\nc\n");
    commit_all(p, "main change", "2024-03-03T10:00:00Z");

    git_at(p, &["merge", "--no-ff", "feat", "-m", "merge feat"], "2024-03-04T10:00:00Z");
    let merge = rev_parse(p, "HEAD");

    let work = tempdir().unwrap();
    let out = authorstat(p, work.path())
        .args(["--commit", &merge])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();

    assert!(stdout.contains("User"));
    assert!(table_rows(&stdout).is_empty(), "unexpected rows in:\n{stdout}");
}

#[test]
fn single_commit_counts_only_that_commit() {
    if !has_git() {
        return;
    }
    let repo = alice_repo();
    let work = tempdir().unwrap();
    let removal = rev_parse(repo.path(), "HEAD");

    let out = authorstat(repo.path(), work.path())
        .args(["--commit", &removal])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();

    assert_eq!(
        table_rows(&stdout),
        vec!["Alice                |      0 |      3 |      3".to_string()]
    );
}

#[test]
fn branch_restricts_to_remote_tracking_ref() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    let p = dir.path();
    init_git_repo(p, "Alice");

    write_file(p, "main.py", "m\n");
    commit_all(p, "root", "2024-04-01T10:00:00Z");
    write_file(p, "main.py", "m\nm2\n");
    commit_all(p, "main work", "2024-04-02T10:00:00Z");

    git(p, &["checkout", "-q", "-b", "side", "HEAD~1"]);
    git(p, &["config", "user.name", "Bob"]);
    write_file(p, "side.ts", "s1\ns2\ns3\n");
    commit_all(p, "side work", "2024-04-03T10:00:00Z");
    git(p, &["checkout", "-q", "main"]);

    let work = tempdir().unwrap();
    let range = ["--since", "2024-01-01", "--until", "2024-12-31"];

    let side = authorstat(p, work.path())
        .args(range)
        .args(["--branch", "side"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(
        table_rows(&String::from_utf8(side).unwrap()),
        vec!["Bob                  |      3 |      0 |      3".to_string()]
    );

    let all = authorstat(p, work.path())
        .args(range)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let mut rows = table_rows(&String::from_utf8(all).unwrap());
    rows.sort();
    assert_eq!(
        rows,
        vec![
            "Alice                |      1 |      0 |      1".to_string(),
            "Bob                  |      3 |      0 |      3".to_string(),
        ]
    );
}

#[test]
fn json_output_is_machine_readable() {
    if !has_git() {
        return;
    }
    let repo = alice_repo();
    let work = tempdir().unwrap();

    let out = authorstat(repo.path(), work.path())
        .args(["--since", "2024-01-01", "--until", "2024-12-31", "--json", "--ext", ".txt"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(v["extensions"], serde_json::json!([".txt"]));
    let authors = v["authors"].as_array().unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0]["name"], "Alice");
    assert_eq!(authors[0]["additions"], 4);
    assert_eq!(authors[0]["deletions"], 0);
}

#[test]
fn temporary_clone_is_removed() {
    if !has_git() {
        return;
    }
    let repo = alice_repo();
    let work = tempdir().unwrap();

    let out = authorstat(repo.path(), work.path())
        .args(["--since", "2024-01-01", "--until", "2024-12-31"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();

    let line = stdout
        .lines()
        .find(|l| l.starts_with("Cloning "))
        .expect("progress line");
    let clone_dir = line
        .rsplit_once(" into ")
        .map(|(_, rest)| PathBuf::from(rest.trim_end_matches("...")))
        .expect("clone dir in progress line");
    assert!(!clone_dir.exists(), "{} still exists", clone_dir.display());
}

#[test]
fn missing_selection_prints_no_table() {
    let work = tempdir().unwrap();
    let assert = Command::cargo_bin("authorstat")
        .unwrap()
        .current_dir(work.path())
        .args(["--repo-url", "https://example.invalid/repo.git", "--since", "2024-01-01"])
        .assert()
        .code(2);
    let output = assert.get_output();
    assert!(!String::from_utf8_lossy(&output.stdout).contains("User"));
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("Specify either --commit or both --since and --until"));
}

#[test]
fn unknown_commit_is_not_found() {
    if !has_git() {
        return;
    }
    let repo = alice_repo();
    let work = tempdir().unwrap();

    let assert = authorstat(repo.path(), work.path())
        .args(["--commit", "0123456789abcdef0123456789abcdef01234567"])
        .assert()
        .code(4);
    assert!(!String::from_utf8_lossy(&assert.get_output().stdout).contains("User"));
}

#[test]
fn unknown_branch_is_not_found() {
    if !has_git() {
        return;
    }
    let repo = alice_repo();
    let work = tempdir().unwrap();

    authorstat(repo.path(), work.path())
        .args(["--since", "2024-01-01", "--until", "2024-12-31", "--branch", "nope"])
        .assert()
        .code(4);
}

#[test]
fn clone_failure_exits_with_clone_code() {
    let work = tempdir().unwrap();
    let missing = work.path().join("no-such-repo");

    let assert = authorstat(&missing, work.path())
        .args(["--commit", "HEAD"])
        .assert()
        .code(3);
    assert!(String::from_utf8_lossy(&assert.get_output().stderr).contains("Clone failed"));
}
