//! Integration tests for the `rf` binary.
//!
//! These tests exercise the full CLI: argument parsing, exit codes and what
//! reaches stdout and stderr.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::TemplateRepo;

const CREDENTIAL_VARS: [&str; 5] = [
    "AZURE_TENANT_ID",
    "AZURE_CLIENT_ID",
    "AZURE_CLIENT_SECRET",
    "FABRIC_WORKSPACE_ID",
    "WORKSPACE_ID",
];

/// Get a command for running rf in `repo`, with no credentials set.
fn rf(repo: &TemplateRepo) -> Command {
    let mut cmd = Command::cargo_bin("rf").unwrap();
    cmd.current_dir(repo.path()).env_remove("RUST_LOG");
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_lists_commands() {
    let repo = TemplateRepo::new(&["EMEA"]);
    rf(&repo)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("publish"));
}

#[test]
fn version_flag_works() {
    let repo = TemplateRepo::new(&["EMEA"]);
    rf(&repo)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rf"));
}

#[test]
fn plan_lists_regions_without_writing() {
    let repo = TemplateRepo::new(&["EMEA", "APAC"]);
    rf(&repo)
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sales_EMEA (EMEA)"))
        .stdout(predicate::str::contains("Sales_APAC.Report [new]"))
        .stdout(predicate::str::contains("2 region(s) planned"));
    assert!(!repo.join("Sales_EMEA.SemanticModel").exists());
}

#[test]
fn generate_writes_artifacts() {
    let repo = TemplateRepo::new(&["EMEA"]);
    rf(&repo)
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 1 region(s)"));
    assert!(repo.join("Sales_EMEA.Report/definition.pbir").is_file());
}

#[test]
fn cwd_flag_selects_the_working_directory() {
    let repo = TemplateRepo::new(&["EMEA"]);
    let elsewhere = tempfile::TempDir::new().unwrap();
    Command::cargo_bin("rf")
        .unwrap()
        .current_dir(elsewhere.path())
        .arg("--cwd")
        .arg(repo.path())
        .args(["generate", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(repo.join("Sales_EMEA.SemanticModel/.platform").is_file());
}

#[test]
fn plan_shows_existing_artifacts() {
    let repo = TemplateRepo::new(&["EMEA"]);
    rf(&repo).arg("generate").assert().success();
    rf(&repo)
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sales_EMEA.SemanticModel [exists]"));
}

#[test]
fn missing_config_fails_with_context() {
    let repo = TemplateRepo::new(&["EMEA"]);
    std::fs::remove_file(repo.join("config/regions")).unwrap();
    rf(&repo)
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: failed to load regions config"));
}

#[test]
fn publish_without_credentials_names_every_missing_variable() {
    let repo = TemplateRepo::new(&["EMEA"]);
    rf(&repo).arg("generate").assert().success();
    rf(&repo)
        .env("AZURE_CLIENT_ID", "client")
        .arg("publish")
        .assert()
        .failure()
        .stderr(predicate::str::contains("AZURE_TENANT_ID"))
        .stderr(predicate::str::contains("AZURE_CLIENT_SECRET"))
        .stderr(predicate::str::contains("FABRIC_WORKSPACE_ID"))
        .stderr(predicate::str::contains("AZURE_CLIENT_ID,").not());
}

#[test]
fn invalid_settings_file_is_rejected() {
    let repo = TemplateRepo::new(&["EMEA"]);
    repo.write("publish.toml", "operation_timeout_secs = 0\n");
    rf(&repo)
        .args(["publish", "--settings", "publish.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("operation_timeout_secs"));
}

#[test]
fn completion_emits_a_script() {
    let repo = TemplateRepo::new(&["EMEA"]);
    rf(&repo)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rf"));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_generates_then_publishes() {
    let repo = TemplateRepo::new(&["EMEA"]);
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-abc",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/workspaces/ws-1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/workspaces/ws-1/semanticModels"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "model-1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/workspaces/ws-1/reports"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "report-1"})))
        .mount(&server)
        .await;

    repo.write(
        "publish.toml",
        &format!(
            "api_base = \"{uri}/v1\"\nauthority = \"{uri}\"\nretry_count = 0\n",
            uri = server.uri()
        ),
    );

    rf(&repo)
        .env("AZURE_TENANT_ID", "tenant-1")
        .env("AZURE_CLIENT_ID", "client-1")
        .env("AZURE_CLIENT_SECRET", "very-secret")
        .env("FABRIC_WORKSPACE_ID", "ws-1")
        .args(["run", "--settings", "publish.toml", "--debug"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 1 region(s)"))
        .stdout(predicate::str::contains("model-1"))
        .stdout(predicate::str::contains("Published 1 region(s)"))
        .stdout(predicate::str::contains("very-secret").not())
        .stderr(predicate::str::contains("very-secret").not());

    let pbir = repo.read_json("Sales_EMEA.Report/definition.pbir");
    assert_eq!(
        pbir["datasetReference"]["byConnection"]["connectionString"],
        "semanticmodelid=model-1"
    );
}
