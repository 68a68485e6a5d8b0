//! End-to-end tests driving the `confctl` binary against a temp prefix

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SCHEMA: &str = r#"{
    "magic": "dsg.config.meta",
    "version": "1.0",
    "contents": {
        "export": {"value": false},
        "greeting": {"value": "hello", "description": "Greeting text"},
        "locked": {"value": 1, "permissions": "readonly"}
    }
}"#;

/// Lay out a schema install under `<prefix>/usr/share/config-center/apps`.
fn install_schema(prefix: &Path, appid: &str, resource: &str) {
    let dir = prefix
        .join("usr/share/config-center/apps")
        .join(appid)
        .join("configs");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{resource}.json")), SCHEMA).unwrap();
}

fn confctl(prefix: &Path) -> Command {
    // the uid defaults to the invoking user, which is stable across the
    // invocations within one test
    let mut cmd = Command::cargo_bin("confctl").unwrap();
    cmd.arg("-p").arg(prefix);
    cmd
}

#[test]
fn test_get_default_value() {
    let temp = TempDir::new().unwrap();
    install_schema(temp.path(), "app", "res");

    confctl(temp.path())
        .args(["get", "-a", "app", "-r", "res", "-k", "export"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn test_get_key_list() {
    let temp = TempDir::new().unwrap();
    install_schema(temp.path(), "app", "res");

    confctl(temp.path())
        .args(["get", "-a", "app", "-r", "res"])
        .assert()
        .success()
        .stdout("export\ngreeting\nlocked\n");
}

#[test]
fn test_set_then_get_round_trip() {
    let temp = TempDir::new().unwrap();
    install_schema(temp.path(), "app", "res");

    confctl(temp.path())
        .args(["set", "-a", "app", "-r", "res", "-k", "export", "-v", "true"])
        .assert()
        .success();

    confctl(temp.path())
        .args(["get", "-a", "app", "-r", "res", "-k", "export"])
        .assert()
        .success()
        .stdout("true\n");
}

#[test]
fn test_reset_restores_default() {
    let temp = TempDir::new().unwrap();
    install_schema(temp.path(), "app", "res");

    confctl(temp.path())
        .args(["set", "-a", "app", "-r", "res", "-k", "greeting", "-v", "hi"])
        .assert()
        .success();
    confctl(temp.path())
        .args(["reset", "-a", "app", "-r", "res", "-k", "greeting"])
        .assert()
        .success();
    confctl(temp.path())
        .args(["get", "-a", "app", "-r", "res", "-k", "greeting"])
        .assert()
        .success()
        .stdout("\"hello\"\n");
}

#[test]
fn test_get_metadata_methods() {
    let temp = TempDir::new().unwrap();
    install_schema(temp.path(), "app", "res");

    confctl(temp.path())
        .args(["get", "-a", "app", "-r", "res", "-k", "locked", "-m", "permissions"])
        .assert()
        .success()
        .stdout("readonly\n");

    confctl(temp.path())
        .args(["get", "-a", "app", "-r", "res", "-k", "greeting", "-m", "description"])
        .assert()
        .success()
        .stdout("Greeting text\n");

    confctl(temp.path())
        .args(["get", "-a", "app", "-r", "res", "-k", "export", "-m", "is-default"])
        .assert()
        .success()
        .stdout("true\n");
}

#[test]
fn test_set_readonly_key_fails() {
    let temp = TempDir::new().unwrap();
    install_schema(temp.path(), "app", "res");

    confctl(temp.path())
        .args(["set", "-a", "app", "-r", "res", "-k", "locked", "-v", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("permission denied"));
}

#[test]
fn test_unknown_resource_fails() {
    let temp = TempDir::new().unwrap();
    install_schema(temp.path(), "app", "res");

    confctl(temp.path())
        .args(["get", "-a", "app", "-r", "ghost", "-k", "export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_resource_defaults_to_appid() {
    let temp = TempDir::new().unwrap();
    install_schema(temp.path(), "app", "app");

    confctl(temp.path())
        .args(["get", "-a", "app", "-k", "export"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn test_list_applications_and_resources() {
    let temp = TempDir::new().unwrap();
    install_schema(temp.path(), "alpha", "res-a");
    install_schema(temp.path(), "beta", "res-b");

    confctl(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout("alpha\nbeta\n");

    confctl(temp.path())
        .args(["list", "-a", "alpha"])
        .assert()
        .success()
        .stdout("res-a\n");

    confctl(temp.path())
        .args(["list", "-a", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not exist appid"));
}

#[test]
fn test_export_csv() {
    let temp = TempDir::new().unwrap();
    install_schema(temp.path(), "app", "res");

    confctl(temp.path())
        .args(["set", "-a", "app", "-r", "res", "-k", "export", "-v", "true"])
        .assert()
        .success();

    confctl(temp.path())
        .args(["export", "-a", "app"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "appid,resource,subpath,key,value,is_default",
        ))
        .stdout(predicate::str::contains("app,res,,export,true,false"))
        .stdout(predicate::str::contains("app,res,,locked,1,true"));
}
