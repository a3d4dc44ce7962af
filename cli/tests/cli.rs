use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tempfile::tempdir;

fn devdeck(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("devdeck").unwrap();
    cmd.env("DEVDECK_HOME", home)
        .env_remove("DEVDECK_STATE_BACKEND")
        .env_remove("DEVDECK_STATE_JSON")
        .env_remove("DEVDECK_STATE_DB")
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn repo(root: &Path, name: &str, readme: &str) -> std::path::PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(dir.join(".git")).unwrap();
    fs::write(dir.join("README.md"), readme).unwrap();
    dir
}

fn list_json(home: &Path) -> Vec<serde_json::Value> {
    let output = devdeck(home).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn setup() -> (TempDir, TempDir) {
    (tempdir().unwrap(), tempdir().unwrap())
}

#[test]
fn add_local_then_favorite_by_prefix() -> Result<(), Box<dyn std::error::Error>> {
    let (home, src) = setup();
    let app = repo(src.path(), "app", "# App\n\nShips things.");

    devdeck(home.path())
        .args(["add-local", app.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Added app"));

    let projects = list_json(home.path());
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["kind"], "local");
    assert_eq!(projects[0]["summary"], "App");
    let id = projects[0]["id"].as_str().unwrap().to_string();

    devdeck(home.path())
        .args(["favorite", &id[..8]])
        .assert()
        .success()
        .stdout(contains("app is now a favorite"));

    // adding the same directory again keeps the single entry and the flag
    devdeck(home.path())
        .args(["add-local", app.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Updated app"));
    let projects = list_json(home.path());
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["is_favorite"], true);
    assert_eq!(projects[0]["id"], id.as_str());
    Ok(())
}

#[test]
fn configured_roots_are_scanned() -> Result<(), Box<dyn std::error::Error>> {
    let (home, src) = setup();
    repo(src.path(), "one", "First.");
    repo(src.path(), "two", "Second.");
    fs::create_dir_all(src.path().join("two/nested/.git"))?;

    devdeck(home.path())
        .args(["config", "roots", "add", src.path().to_str().unwrap()])
        .assert()
        .success();
    devdeck(home.path())
        .args(["config", "roots", "add", src.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("already a scan location"));

    devdeck(home.path())
        .arg("scan")
        .assert()
        .success()
        .stdout(contains("Scanned 2 projects: 2 added, 0 updated, 0 failed"));
    devdeck(home.path())
        .arg("scan")
        .assert()
        .success()
        .stdout(contains("Scanned 2 projects: 0 added, 2 updated, 0 failed"));

    devdeck(home.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(contains("Projects: 2"));
    Ok(())
}

#[test]
fn auto_scan_picks_up_new_checkouts() -> Result<(), Box<dyn std::error::Error>> {
    let (home, src) = setup();
    devdeck(home.path())
        .args(["config", "roots", "add", src.path().to_str().unwrap()])
        .assert()
        .success();
    devdeck(home.path())
        .args(["config", "auto-scan", "on"])
        .assert()
        .success()
        .stdout(contains("Auto-scan on"));

    repo(src.path(), "fresh", "Just cloned.");
    devdeck(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(contains("fresh"));
    Ok(())
}

#[test]
fn tags_summary_and_removal() -> Result<(), Box<dyn std::error::Error>> {
    let (home, src) = setup();
    let app = repo(src.path(), "app", "Original.");
    devdeck(home.path())
        .args(["add-local", app.to_str().unwrap()])
        .assert()
        .success();
    let id = list_json(home.path())[0]["id"].as_str().unwrap().to_string();

    devdeck(home.path())
        .args(["tag", "add", &id, "tooling"])
        .assert()
        .success()
        .stdout(contains("Tagged app with tooling"));
    devdeck(home.path())
        .args(["tag", "add", &id, "   "])
        .assert()
        .failure()
        .stderr(contains("tag must not be empty"));
    devdeck(home.path())
        .args(["summary", &id, "Hand written."])
        .assert()
        .success();
    devdeck(home.path())
        .arg("tags")
        .assert()
        .success()
        .stdout(contains("tooling (1)"));
    devdeck(home.path())
        .args(["list", "--search", "hand"])
        .assert()
        .success()
        .stdout(contains("app"));

    devdeck(home.path())
        .args(["rm", &id])
        .assert()
        .success()
        .stdout(contains("Removed app"));
    assert!(list_json(home.path()).is_empty());
    Ok(())
}

#[test]
fn unknown_id_and_bad_url_fail() {
    let (home, _src) = setup();
    devdeck(home.path())
        .args(["favorite", "deadbeef"])
        .assert()
        .failure()
        .stderr(contains("no project matches id deadbeef"));
    devdeck(home.path())
        .args(["add", "https://gitlab.com/a/b"])
        .assert()
        .failure()
        .stderr(contains("invalid GitHub URL"));
}

#[test]
fn clone_requires_existing_checkout() {
    let (home, src) = setup();
    devdeck(home.path())
        .args([
            "clone",
            "https://github.com/me/tool",
            src.path().join("tool").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("no checkout"));

    let tool = repo(src.path(), "tool", "A tool.");
    devdeck(home.path())
        .args(["clone", "https://github.com/me/tool", tool.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Added tool"));
    let projects = list_json(home.path());
    assert_eq!(projects[0]["git_url"], "https://github.com/me/tool");
}

#[test]
fn migrate_copies_json_state_into_sqlite() -> Result<(), Box<dyn std::error::Error>> {
    let (home, src) = setup();
    let app = repo(src.path(), "app", "Hi.");
    devdeck(home.path())
        .args(["add-local", app.to_str().unwrap()])
        .assert()
        .success();

    let json = home.path().join("state.json");
    let sqlite = home.path().join("copy.db");
    devdeck(home.path())
        .args([
            "migrate",
            "--json",
            json.to_str().unwrap(),
            "--sqlite",
            sqlite.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("Migrated 1 projects"));
    assert!(sqlite.exists());

    devdeck(home.path())
        .env("DEVDECK_STATE_BACKEND", "sqlite")
        .env("DEVDECK_STATE_DB", &sqlite)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("app"));
    Ok(())
}

#[test]
fn export_then_import_restores_state() -> Result<(), Box<dyn std::error::Error>> {
    let (home, src) = setup();
    let app = repo(src.path(), "app", "Hi.");
    devdeck(home.path())
        .args(["add-local", app.to_str().unwrap()])
        .assert()
        .success();
    let exported = devdeck(home.path()).arg("export").output()?.stdout;

    let other = tempdir()?;
    devdeck(other.path())
        .arg("import")
        .write_stdin(exported)
        .assert()
        .success()
        .stdout(contains("Imported 1 projects"));
    assert_eq!(list_json(other.path()).len(), 1);
    Ok(())
}
