#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use mockito::{Matcher, ServerGuard};
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn campus_cmd(server: &ServerGuard, data: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("campus"));
    cmd.env("CAMPUS_DATA_DIR", data.path().as_os_str())
        .env("NO_COLOR", "1")
        .env_remove("CAMPUS_API_URL")
        .env_remove("RUST_LOG")
        .args(["--api-url", &server.url()]);
    cmd
}

#[test]
fn test_login_then_whoami() {
    let mut server = mockito::Server::new();
    let data = TempDir::new().unwrap();
    server
        .mock("POST", "/api/login")
        .match_body(Matcher::PartialJson(
            serde_json::json!({"email": "ada@school.test"}),
        ))
        .with_body(
            r#"{"success": true, "token": "tok-ada",
                "user": {"_id": "a1", "name": "Ada Obi", "email": "ada@school.test", "role": "SUPER_ADMIN"}}"#,
        )
        .create();

    // 1. Sign in
    campus_cmd(&server, &data)
        .args(["login", "--email", "Ada@School.test", "--password", "pw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as Ada Obi"));

    assert!(data.path().join("session.json").exists());

    // 2. A fresh process remembers who we are
    campus_cmd(&server, &data)
        .args(["whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ada@school.test"));

    // 3. Sign out, then whoami fails
    campus_cmd(&server, &data)
        .args(["logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out"));
    campus_cmd(&server, &data)
        .args(["whoami"])
        .assert()
        .failure();
}

#[test]
fn test_gallery_list_as_json() {
    let mut server = mockito::Server::new();
    let data = TempDir::new().unwrap();
    server
        .mock("GET", "/api/gallery")
        .with_body(
            r#"{"success": true, "galleries": [
                {"_id": "g1", "title": "Relay heats", "category": "SPORTS_DAY", "files": ["/u/1.jpg", "/u/2.jpg"]},
                {"_id": "g2", "title": "Choir", "category": "MUSIC_FESTIVAL", "files": ["/u/3.mp4"]}
            ]}"#,
        )
        .create();

    let output = campus_cmd(&server, &data)
        .args(["gallery", "list", "--json", "--type", "video"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = doc["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Choir");
    assert_eq!(items[0]["fileType"], "video");
    assert_eq!(items[0]["fileCount"], 1);
    assert_eq!(doc["data"]["totalItems"], 1);
}

#[test]
fn test_campaign_without_recipients_fails() {
    let mut server = mockito::Server::new();
    let data = TempDir::new().unwrap();
    server
        .mock("GET", "/api/staff")
        .with_body(r#"{"success": true, "staff": []}"#)
        .create();
    let post = server.mock("POST", "/api/emails").expect(0).create();

    campus_cmd(&server, &data)
        .args([
            "campaigns",
            "create",
            "--title",
            "Staff meeting",
            "--subject",
            "Monday",
            "--content",
            "Hall, 8am",
            "--to",
            "staff",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No recipients found"));

    post.assert();
}

#[test]
fn test_home_falls_back_to_sample_data() {
    let mut server = mockito::Server::new();
    let data = TempDir::new().unwrap();
    server
        .mock("GET", Matcher::Any)
        .with_status(500)
        .create();

    campus_cmd(&server, &data)
        .args(["home"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Our School"))
        .stdout(predicate::str::contains("Showing sample data"));
}

#[test]
fn test_unknown_filter_is_a_usage_error() {
    let server = mockito::Server::new();
    let data = TempDir::new().unwrap();

    campus_cmd(&server, &data)
        .args(["admins", "list", "--role", "janitor"])
        .assert()
        .failure()
        .code(2);
}
