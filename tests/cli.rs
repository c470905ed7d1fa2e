use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;

macro_rules! cargo_run {
    ($cmd:expr, $($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

#[test]
fn add_then_search() -> Result<()> {
    let data_dir = assert_fs::TempDir::new()?;
    let d = data_dir.path();

    cargo_run!("mediasearch", "-d", d, "add", "id1", "--vector", "1,0,0", "-a", "a1", "-t", "t1")
        .success();
    cargo_run!("mediasearch", "-d", d, "add", "id2", "--vector", "0,1,0", "-a", "a2").success();
    cargo_run!("mediasearch", "-d", d, "add", "id3", "--vector=-1,0,0", "-a", "a2").success();

    cargo_run!("mediasearch", "-d", d, "search", "--vector", "1,0,0", "-k", "1")
        .success()
        .stdout(predicate::str::contains("id1").and(predicate::str::contains("id2").not()));

    cargo_run!("mediasearch", "-d", d, "search", "--vector", "1,0,0", "-a", "a2", "--output-format", "json")
        .success()
        .stdout(predicate::str::contains("\"media_id\": \"id2\"").and(predicate::str::contains("id1").not()));

    cargo_run!("mediasearch", "-d", d, "albums")
        .success()
        .stdout(predicate::str::contains("1\ta1").and(predicate::str::contains("2\ta2")));

    Ok(())
}

#[test]
fn dimension_mismatch_fails() -> Result<()> {
    let data_dir = assert_fs::TempDir::new()?;
    let d = data_dir.path();

    cargo_run!("mediasearch", "-d", d, "add", "id1", "--vector", "1,0,0", "-a", "a1").success();
    cargo_run!("mediasearch", "-d", d, "add", "id2", "--vector", "1,0", "-a", "a1")
        .failure()
        .stderr(predicate::str::contains("维度"));

    Ok(())
}

#[test]
fn search_empty() -> Result<()> {
    let data_dir = assert_fs::TempDir::new()?;

    cargo_run!("mediasearch", "-d", data_dir.path(), "search", "--vector", "1,0,0")
        .success()
        .stdout(predicate::str::is_empty());

    Ok(())
}
