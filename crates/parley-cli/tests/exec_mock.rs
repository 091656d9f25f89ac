//! Integration tests for one-shot sends against a mock backend.

mod fixtures;

use assert_cmd::cargo::cargo_bin_cmd;
use fixtures::{can_bind_localhost, store_session, stored_session, temp_home};
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_exec_creates_session_and_prints_reply() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get_session_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session_id": "s-new"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/get_message_history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": []})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/send_message"))
        .and(body_json(json!({"message": "Who is Harry?", "session_id": "s-new"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "A wizard."})))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("parley")
        .env("PARLEY_HOME", home.path())
        .args(["--base-url", &server.uri(), "exec", "-p", "Who is Harry?"])
        .assert()
        .success()
        .stdout(predicate::str::diff("A wizard.\n"));

    assert_eq!(stored_session(home.path()).as_deref(), Some("s-new"));
}

#[tokio::test]
async fn test_exec_resumes_stored_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    store_session(home.path(), "s-old");
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get_session_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session_id": "s-x"})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/get_message_history"))
        .and(body_json(json!({"session_id": "s-old"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/send_message"))
        .and(body_json(json!({"message": "again", "session_id": "s-old"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "still here"})))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("parley")
        .env("PARLEY_HOME", home.path())
        .args(["--base-url", &server.uri(), "exec", "--prompt", "again"])
        .assert()
        .success()
        .stdout(predicate::str::diff("still here\n"));
}

#[tokio::test]
async fn test_exec_prints_fallback_when_send_fails() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    store_session(home.path(), "s-1");
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/get_message_history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/send_message"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "model offline"})))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("parley")
        .env("PARLEY_HOME", home.path())
        .args(["--base-url", &server.uri(), "exec", "-p", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("I'm sorry, I don't understand that."));
}

#[tokio::test]
async fn test_exec_uses_configured_fallback_reply() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    std::fs::write(
        home.path().join("config.toml"),
        "fallback_reply = \"Backend is napping.\"\n",
    )
    .unwrap();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get_session_id"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    cargo_bin_cmd!("parley")
        .env("PARLEY_HOME", home.path())
        .args(["--base-url", &server.uri(), "exec", "-p", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::diff("Backend is napping.\n"));

    assert_eq!(stored_session(home.path()), None);
}

#[test]
fn test_exec_rejects_blank_prompt() {
    let home = temp_home();

    cargo_bin_cmd!("parley")
        .env("PARLEY_HOME", home.path())
        .args(["--base-url", "http://127.0.0.1:9/", "exec", "-p", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be empty"));
}
