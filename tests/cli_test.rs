//! CLI integration tests for the mockthis binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command with an isolated config dir and an API URL nothing listens on.
fn cmd(config: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mockthis"));
    cmd.env("MOCKTHIS_CONFIG_DIR", config.path())
        .env("MOCKTHIS_API_URL", "http://127.0.0.1:9")
        .env_remove("MOCKTHIS_LOG");
    cmd
}

fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Config dir holding a saved session for `tok-123`.
fn logged_in() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_temp_file(
        &dir,
        ".credentials",
        r#"{"email": "dev@example.com", "token": "tok-123"}"#,
    );
    dir
}

mod create_command {
    use super::*;

    #[test]
    fn dry_run_prints_descriptor_with_defaults() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .args(["create", "--dry-run", "--body", "hello"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""method": "GET""#))
            .stdout(predicate::str::contains(r#""httpStatus": 200"#))
            .stdout(predicate::str::contains(r#""responseContentType": "application/json""#))
            .stdout(predicate::str::contains(r#""charset": "UTF-8""#))
            .stdout(predicate::str::contains(r#""responseBody": "hello""#))
            .stdout(predicate::str::contains("authCredentials").not());
    }

    #[test]
    fn missing_body_is_rejected() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .args(["create", "--dry-run", "--method", "POST"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("responseBody"));
    }

    #[test]
    fn malformed_status_is_rejected() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .args(["create", "--dry-run", "--body", "x", "--http-status", "abc"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("httpStatus"));
    }

    #[test]
    fn yaml_file_with_auth() {
        let config = TempDir::new().unwrap();
        let file = write_temp_file(
            &config,
            "endpoint.yaml",
            r#"
endpoint:
  method: POST
  response:
    http-status: 201
    body: '{"ok": true}'
  auth:
    type: basic
    properties:
      username: admin
      password: secret
"#,
        );

        cmd(&config)
            .args(["create", "--dry-run", "-f", file.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""method": "POST""#))
            .stdout(predicate::str::contains(r#""httpStatus": 201"#))
            .stdout(predicate::str::contains(r#""type": "basic""#))
            .stdout(predicate::str::contains(r#""username": "admin""#))
            .stdout(predicate::str::contains(r#""password": "secret""#));
    }

    #[test]
    fn command_line_overrides_file() {
        let config = TempDir::new().unwrap();
        let file = write_temp_file(
            &config,
            "endpoint.json",
            r#"{"endpoint": {"method": "POST", "response": {"body": "from file"}}}"#,
        );

        cmd(&config)
            .args([
                "create",
                "--dry-run",
                "--file",
                file.to_str().unwrap(),
                "--method",
                "PUT",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""method": "PUT""#))
            .stdout(predicate::str::contains(r#""responseBody": "from file""#));
    }

    #[test]
    fn unsupported_extension() {
        let config = TempDir::new().unwrap();
        let file = write_temp_file(&config, "endpoint.txt", "endpoint: {}");

        cmd(&config)
            .args(["create", "--dry-run", "-f", file.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unsupported file format"));
    }

    #[test]
    fn missing_file() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .args(["create", "--dry-run", "-f", "/nonexistent/endpoint.yaml"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn file_without_endpoint_mapping() {
        let config = TempDir::new().unwrap();
        let file = write_temp_file(&config, "endpoint.yaml", "method: GET\n");

        cmd(&config)
            .args(["create", "--dry-run", "-f", file.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("endpoint"));
    }

    #[test]
    fn unknown_file_key_is_a_binding_error() {
        let config = TempDir::new().unwrap();
        let file = write_temp_file(
            &config,
            "endpoint.json",
            r#"{"endpoint": {"response": {"body": "x", "colour": "red"}}}"#,
        );

        cmd(&config)
            .args(["create", "--dry-run", "-f", file.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("--colour"));
    }

    #[test]
    fn auth_type_without_properties() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .args(["create", "--dry-run", "--body", "x", "--auth-type", "basic"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("auth-properties"));
    }

    #[test]
    fn unknown_auth_type() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .args([
                "create",
                "--dry-run",
                "--body",
                "x",
                "--auth-type",
                "digest",
                "--auth-properties",
                "realm=x",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unsupported authentication type"))
            .stderr(predicate::str::contains("digest"));
    }

    #[test]
    fn body_violating_schema() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .args([
                "create",
                "--dry-run",
                "--body",
                r#"{"greeting": 42}"#,
                "--schema",
                r#"{"type": "object", "properties": {"greeting": {"type": "string"}}}"#,
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("/greeting"));
    }

    #[test]
    fn headers_as_pairs() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .args(["create", "--dry-run", "--body", "x", "--headers", "X-Trace=1, X-Env=dev"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""X-Trace": "1""#))
            .stdout(predicate::str::contains(r#""X-Env": "dev""#));
    }

    #[test]
    fn create_requires_login() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .args(["create", "--body", "x"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("login first"));
    }

    #[test]
    fn create_sends_descriptor_with_token() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/endpoints")
            .match_header("authorization", "Bearer tok-123")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "method": "GET",
                "httpStatus": 200,
                "responseBody": "hello"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"mockUrl": "https://mock.example/abc", "id": "ep-1"}"#)
            .create();

        let config = logged_in();
        cmd(&config)
            .env("MOCKTHIS_API_URL", server.url())
            .args(["create", "--body", "hello"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Endpoint created successfully!"))
            .stdout(predicate::str::contains("Mock URL: https://mock.example/abc"));

        mock.assert();
    }

    #[test]
    fn create_reports_server_status() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/endpoints")
            .with_status(500)
            .create();

        let config = logged_in();
        cmd(&config)
            .env("MOCKTHIS_API_URL", server.url())
            .args(["create", "--body", "hello"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("failed to create endpoint. Status: 500"));
    }
}

mod update_command {
    use super::*;

    #[test]
    fn dry_run_prints_only_changed_fields() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .args(["update", "ep-1", "--dry-run", "--http-status", "404"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""httpStatus": 404"#))
            .stdout(predicate::str::contains("method").not())
            .stdout(predicate::str::contains("responseBody").not());
    }

    #[test]
    fn nothing_to_update() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .args(["update", "ep-1", "--dry-run"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("nothing to update"));
    }

    #[test]
    fn update_patches_endpoint() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PATCH", "/endpoints/ep-1")
            .match_header("authorization", "Bearer tok-123")
            .match_body(mockito::Matcher::Json(serde_json::json!({ "responseBody": "new" })))
            .with_status(200)
            .with_body(r#"{"id": "ep-1", "responseBody": "new"}"#)
            .create();

        let config = logged_in();
        cmd(&config)
            .env("MOCKTHIS_API_URL", server.url())
            .args(["update", "ep-1", "--body", "new"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Endpoint updated successfully!"));

        mock.assert();
    }
}

mod endpoint_commands {
    use super::*;

    const ENDPOINTS: &str = r#"[
        {
            "id": "ep-1",
            "mockIdentifier": "greeting",
            "httpStatus": 200,
            "responseContentType": "application/json",
            "charset": "UTF-8",
            "responseBody": "{\"hello\":\"world\"}",
            "endpointUrl": "https://mock.example/greeting"
        },
        {
            "id": "ep-2",
            "mockIdentifier": "teapot",
            "httpStatus": 418,
            "responseBody": "short and stout"
        }
    ]"#;

    fn serve_endpoints(server: &mut mockito::Server) -> mockito::Mock {
        server
            .mock("GET", "/endpoints")
            .match_header("authorization", "Bearer tok-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ENDPOINTS)
            .create()
    }

    #[test]
    fn list_without_login() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .arg("list")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("you need to login first"));
    }

    #[test]
    fn list_prints_endpoints() {
        let mut server = mockito::Server::new();
        let mock = serve_endpoints(&mut server);

        let config = logged_in();
        cmd(&config)
            .env("MOCKTHIS_API_URL", server.url())
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""id": "ep-1""#))
            .stdout(predicate::str::contains(r#""id": "ep-2""#));

        mock.assert();
    }

    #[test]
    fn get_by_mock_identifier() {
        let mut server = mockito::Server::new();
        let _mock = serve_endpoints(&mut server);

        let config = logged_in();
        cmd(&config)
            .env("MOCKTHIS_API_URL", server.url())
            .args(["get", "teapot"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Endpoint Details:"))
            .stdout(predicate::str::contains("ID: ep-2"))
            .stdout(predicate::str::contains("HTTP Status: 418"));
    }

    #[test]
    fn get_as_table() {
        let mut server = mockito::Server::new();
        let _mock = serve_endpoints(&mut server);

        let config = logged_in();
        cmd(&config)
            .env("MOCKTHIS_API_URL", server.url())
            .args(["get", "ep-1", "-o", "table"])
            .assert()
            .success()
            .stdout(predicate::str::contains("| Key | Value |"))
            .stdout(predicate::str::contains("| Mock Identifier | greeting |"));
    }

    #[test]
    fn get_as_json() {
        let mut server = mockito::Server::new();
        let _mock = serve_endpoints(&mut server);

        let config = logged_in();
        cmd(&config)
            .env("MOCKTHIS_API_URL", server.url())
            .args(["get", "ep-1", "--output", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""endpointUrl": "https://mock.example/greeting""#));
    }

    #[test]
    fn get_unknown_endpoint() {
        let mut server = mockito::Server::new();
        let _mock = serve_endpoints(&mut server);

        let config = logged_in();
        cmd(&config)
            .env("MOCKTHIS_API_URL", server.url())
            .args(["get", "nope"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("endpoint not found: nope"));
    }

    #[test]
    fn delete_endpoint() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("DELETE", "/endpoints/ep-1")
            .match_header("authorization", "Bearer tok-123")
            .with_status(204)
            .create();

        let config = logged_in();
        cmd(&config)
            .env("MOCKTHIS_API_URL", server.url())
            .args(["delete", "ep-1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Endpoint deleted successfully!"));

        mock.assert();
    }

    #[test]
    fn delete_unknown_endpoint() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("DELETE", "/endpoints/ep-9")
            .with_status(404)
            .create();

        let config = logged_in();
        cmd(&config)
            .env("MOCKTHIS_API_URL", server.url())
            .args(["delete", "ep-9"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("failed to delete endpoint. Status: 404"));
    }

    #[test]
    fn unreachable_api_is_an_io_error() {
        let config = logged_in();
        cmd(&config)
            .arg("list")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("request to http://127.0.0.1:9/endpoints failed"));
    }
}

mod account_commands {
    use super::*;

    #[test]
    fn login_rejected_suggests_register() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/login")
            .match_body(mockito::Matcher::Json(serde_json::json!({ "email": "nobody@example.com" })))
            .with_status(404)
            .create();

        let config = TempDir::new().unwrap();
        cmd(&config)
            .env("MOCKTHIS_API_URL", server.url())
            .args(["login", "nobody@example.com"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("mockthis register"));

        mock.assert();
        assert!(!config.path().join(".credentials").exists());
    }

    #[test]
    fn login_with_malformed_email() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .args(["login", "not-an-email"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("not a valid email address"));
    }

    #[test]
    fn login_prompt_with_closed_stdin() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .arg("login")
            .write_stdin("")
            .assert()
            .code(3)
            .stdout(predicate::str::contains("Enter your email: "));
    }

    #[test]
    fn register_rejects_bad_country_before_sending() {
        let config = TempDir::new().unwrap();
        cmd(&config)
            .args([
                "register",
                "--name",
                "Ada Lovelace",
                "--email",
                "ada@example.com",
                "--github-handle",
                "ada",
                "--country",
                "GBR",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("2-letter country code"));
    }

    #[test]
    fn register_failure_reports_status() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/register")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "fullName": "Ada Lovelace",
                "email": "ada@example.com",
                "githubHandle": "ada",
                "country": "GB"
            })))
            .with_status(409)
            .create();

        let config = TempDir::new().unwrap();
        cmd(&config)
            .env("MOCKTHIS_API_URL", server.url())
            .args([
                "register",
                "--name",
                "Ada Lovelace",
                "--email",
                "ada@example.com",
                "--github-handle",
                "ada",
                "--country",
                "gb",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("failed to register. Status: 409"));

        mock.assert();
    }
}

#[test]
fn version_flag() {
    let config = TempDir::new().unwrap();
    cmd(&config)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mockthis"));
}
