use assert_cmd::Command;
use predicates::prelude::*;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;

/// Answers the next `responses.len()` requests in order, then stops.
/// Returns the base URL to point `DEVBLOG_API_URL` at.
fn serve(responses: Vec<(u16, &'static str)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for (status, body) in responses {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap_or(0);
                }
            }
            let mut body_in = vec![0; content_length];
            reader.read_exact(&mut body_in).unwrap();
            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            reader.get_mut().write_all(response.as_bytes()).unwrap();
        }
    });
    format!("http://{}", addr)
}

fn devblog(home: &Path, api_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("devblog").unwrap();
    cmd.env("DEVBLOG_HOME", home)
        .env("DEVBLOG_API_URL", api_url)
        .env("NO_COLOR", "1")
        .env_remove("DEVBLOG_PASSWORD")
        .env_remove("RUST_LOG")
        .env_remove("DEVBLOG_LOG");
    cmd
}

const UNREACHABLE: &str = "http://127.0.0.1:9";

const FEED: &str = r#"[
  {"_id":"1","title":"Spring Boot Basics","excerpt":"Start here","slug":"spring-boot-basics","tags":["java","spring"],"author":"Jane"},
  {"_id":"2","title":"Rust Ownership","excerpt":"Borrowing explained","slug":"rust-ownership","tags":["rust"],"author":{"name":"Bob","email":"bob@example.com"}},
  {"_id":"3","title":"Java Records","excerpt":"Data carriers","tags":["java"]}
]"#;

#[test]
fn config_set_and_show() {
    let home = tempfile::tempdir().unwrap();

    devblog(home.path(), UNREACHABLE)
        .args(["config", "page-size", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("page-size set to 3"));

    devblog(home.path(), UNREACHABLE)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("page-size = 3"))
        .stdout(predicate::str::contains("api-url = "));
}

#[test]
fn invalid_config_value_fails() {
    let home = tempfile::tempdir().unwrap();
    devblog(home.path(), UNREACHABLE)
        .args(["config", "api-url", "ftp://nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("api-url must start with http"));
}

#[test]
fn whoami_and_logout_without_session() {
    let home = tempfile::tempdir().unwrap();
    devblog(home.path(), UNREACHABLE)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("You are not logged in."));
    devblog(home.path(), UNREACHABLE)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("You are not logged in."));
}

#[test]
fn register_rejects_mismatched_passwords_offline() {
    let home = tempfile::tempdir().unwrap();
    devblog(home.path(), UNREACHABLE)
        .args([
            "register",
            "--name",
            "Jane Doe",
            "--email",
            "jane@example.com",
            "--password",
            "secret1",
            "--confirm-password",
            "secret2",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Passwords do not match"));
}

#[test]
fn create_requires_login() {
    let home = tempfile::tempdir().unwrap();
    devblog(home.path(), UNREACHABLE)
        .args(["create", "--no-editor", "--content", "Body", "Title"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn lists_latest_posts_from_service() {
    let home = tempfile::tempdir().unwrap();
    let url = serve(vec![(200, FEED)]);
    devblog(home.path(), &url)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Latest Posts"))
        .stdout(predicate::str::contains("All  java  spring  rust"))
        .stdout(predicate::str::contains("Spring Boot Basics by Jane"))
        .stdout(predicate::str::contains("Java Records by Unknown Author"))
        .stdout(predicate::str::contains("page 1/1 · 3 posts"));
}

#[test]
fn search_filters_and_changes_heading() {
    let home = tempfile::tempdir().unwrap();
    let url = serve(vec![(200, FEED)]);
    devblog(home.path(), &url)
        .args(["list", "--tag", "java", "--search", "records"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Search Results"))
        .stdout(predicate::str::contains("Java Records"))
        .stdout(predicate::str::contains("Spring Boot").not());
}

#[test]
fn empty_result_shows_empty_state() {
    let home = tempfile::tempdir().unwrap();
    let url = serve(vec![(200, FEED)]);
    devblog(home.path(), &url)
        .args(["list", "--search", "kotlin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matching posts found."));
}

#[test]
fn service_error_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let url = serve(vec![(500, r#"{"message":"database down"}"#)]);
    devblog(home.path(), &url)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("database down"));
}

#[test]
fn login_persists_session() {
    let home = tempfile::tempdir().unwrap();
    // payload: {"sub":"jane@example.com","name":"Jane Doe"}
    let url = serve(vec![(
        200,
        r#"{"token":"eyJhbGciOiJub25lIn0.eyJzdWIiOiJqYW5lQGV4YW1wbGUuY29tIiwibmFtZSI6IkphbmUgRG9lIn0.sig"}"#,
    )]);

    devblog(home.path(), &url)
        .args(["login", "--email", "jane@example.com", "--password", "secret1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome back, Jane Doe!"));

    devblog(home.path(), UNREACHABLE)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Jane Doe <jane@example.com>"));

    devblog(home.path(), UNREACHABLE)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));
}

#[test]
fn chat_failure_falls_back_to_apology() {
    let home = tempfile::tempdir().unwrap();
    devblog(home.path(), UNREACHABLE)
        .args(["chat", "hello", "there"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sorry, something went wrong."));
}

#[test]
fn help_is_grouped() {
    let home = tempfile::tempdir().unwrap();
    devblog(home.path(), UNREACHABLE)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reading:"))
        .stdout(predicate::str::contains("Account:"));
}
