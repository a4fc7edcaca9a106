//! Integration tests for the offline command paths

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn cookcompass_cmd(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cookcompass").unwrap();
    // Keep stray .env files and the caller's environment out of the test
    cmd.current_dir(workdir.path())
        .env_remove("API_TOKEN")
        .env_remove("COOKCOMPASS_CONFIG")
        .env_remove("COOKCOMPASS_LLM_URL")
        .env_remove("COOKCOMPASS_EMBEDDING_URL");
    cmd
}

fn write_config(dir: &TempDir, dataset_file: &str) -> PathBuf {
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        format!(
            "embeddings_model: sentence-transformers/all-MiniLM-L6-v2\n\
             llm: meta-llama/Llama-3.1-8B-Instruct\n\
             paths:\n  store: data/recipes.sqlite\n  data: data\n  dataset_file: {}\n\
             llm_service:\n  url: http://127.0.0.1:9\n  max_retries: 0\n",
            dataset_file
        ),
    )
    .unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    cookcompass_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("ingest"));
}

#[test]
fn test_ask_without_token_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "recipes.csv");

    cookcompass_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .arg("ask")
        .arg("chicken soup")
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("API_TOKEN"));
}

#[test]
fn test_blank_token_is_missing() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "recipes.csv");

    cookcompass_cmd(&dir)
        .env("API_TOKEN", "   ")
        .arg("--config")
        .arg(&config)
        .arg("chat")
        .assert()
        .failure()
        .code(4);
}

#[test]
fn test_missing_config_fails() {
    let dir = TempDir::new().unwrap();

    cookcompass_cmd(&dir)
        .env("API_TOKEN", "test-token")
        .env("COOKCOMPASS_CONFIG", dir.path().join("absent.yaml"))
        .arg("ask")
        .arg("chicken soup")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_ingest_missing_dataset_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "absent.csv");

    cookcompass_cmd(&dir)
        .env("API_TOKEN", "test-token")
        .arg("--config")
        .arg(&config)
        .arg("ingest")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Dataset not found"));
}

#[test]
fn test_status_on_empty_store() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "recipes.csv");

    cookcompass_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recipes:         0"))
        .stdout(predicate::str::contains("none registered"));

    assert!(dir.path().join("data/recipes.sqlite").exists());
}

#[test]
fn test_status_json() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "recipes.csv");

    let output = cookcompass_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .arg("--format")
        .arg("json")
        .arg("status")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["recipe_count"], 0);
}
