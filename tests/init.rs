use assert_cmd::Command;
use predicates::prelude::predicate;

mod common;

#[test]
fn new_repository_initiated_with_git_directory() -> Result<(), Box<dyn std::error::Error>> {
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;
    let dir_absolute_path = dir.path().canonicalize()?.display().to_string();
    let mut sut = Command::cargo_bin("grit")?;

    sut.arg("init").arg(dir.path());

    sut.assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^Initialized git directory at .+\n$",
        )?)
        .stdout(predicate::str::contains(dir_absolute_path));

    let git_dir = dir.path().join(".git");
    assert!(git_dir.join("objects").is_dir());
    assert!(git_dir.join("refs").join("heads").is_dir());
    pretty_assertions::assert_eq!(
        std::fs::read_to_string(git_dir.join("HEAD"))?,
        "ref: refs/heads/main\n"
    );

    Ok(())
}

#[test]
fn init_creates_missing_directories() -> Result<(), Box<dyn std::error::Error>> {
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;
    let target = dir.path().join("nested").join("project");

    Command::cargo_bin("grit")?
        .arg("init")
        .arg(&target)
        .assert()
        .success();

    assert!(target.join(".git").join("HEAD").is_file());

    Ok(())
}

#[test]
fn init_defaults_to_current_directory() -> Result<(), Box<dyn std::error::Error>> {
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;

    Command::cargo_bin("grit")?
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    assert!(dir.path().join(".git").join("objects").is_dir());

    Ok(())
}
