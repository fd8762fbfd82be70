use assert_cmd::Command;
use assert_fs::fixture::{FileWriteStr, PathChild};
use common::command::{repository_dir, run_grit_command, stdout_of};
use fake::Fake;
use fake::faker::lorem::en::{Word, Words};
use predicates::Predicate;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

const HELLO_BLOB_ID: &str = "ce013625030ba8dba906f756967f9e9ca394464f";

#[rstest]
fn hash_object_reports_the_well_known_id(
    repository_dir: assert_fs::TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_grit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir.child("hello.txt").write_str("hello\n")?;

    run_grit_command(repository_dir.path(), &["hash-object", "hello.txt"])
        .assert()
        .success()
        .stdout(predicate::eq(format!("{HELLO_BLOB_ID}\n")));

    // without -w nothing is written
    assert!(
        !repository_dir
            .path()
            .join(".git/objects/ce/013625030ba8dba906f756967f9e9ca394464f")
            .exists()
    );

    Ok(())
}

#[rstest]
fn written_blob_round_trips_through_cat_file(
    repository_dir: assert_fs::TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_grit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir.child("hello.txt").write_str("hello\n")?;

    let oid = stdout_of(run_grit_command(
        repository_dir.path(),
        &["hash-object", "-w", "hello.txt"],
    ));
    assert_eq!(oid, HELLO_BLOB_ID);
    assert!(
        repository_dir
            .path()
            .join(".git/objects/ce/013625030ba8dba906f756967f9e9ca394464f")
            .is_file()
    );

    run_grit_command(repository_dir.path(), &["cat-file", "-p", &oid])
        .assert()
        .success()
        .stdout(predicate::eq("hello\n"));

    Ok(())
}

#[test]
fn write_blob_object_successfully() -> Result<(), Box<dyn std::error::Error>> {
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;
    let mut cmd = Command::cargo_bin("grit")?;
    cmd.current_dir(dir.path()).arg("init");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Initialized git directory"));

    let file_name = format!("{}.txt", Word().fake::<String>());
    let file_path = dir.child(file_name.clone());
    let file_content = Words(5..10).fake::<Vec<String>>().join(" ");
    file_path.write_str(&file_content.clone())?;

    let mut sut = Command::cargo_bin("grit")?;
    sut.current_dir(dir.path())
        .arg("hash-object")
        .arg("-w")
        .arg(&file_name);

    let oid = stdout_of(sut);
    assert!(predicate::str::is_match(r"^[0-9a-f]{40}$")?.eval(&oid));

    run_grit_command(dir.path(), &["cat-file", "-p", &oid])
        .assert()
        .success()
        .stdout(predicate::eq(file_content));

    Ok(())
}

#[rstest]
fn cat_file_of_unknown_object_fails(
    repository_dir: assert_fs::TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_grit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_grit_command(
        repository_dir.path(),
        &["cat-file", "-p", "0123456789012345678901234567890123456789"],
    )
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("not found"));

    Ok(())
}

#[rstest]
fn hash_object_of_missing_file_fails(
    repository_dir: assert_fs::TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_grit_command(repository_dir.path(), &["hash-object", "missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.txt"));

    Ok(())
}
