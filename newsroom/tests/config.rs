use std::time::Duration;

use clap::Parser;
use llm::Backend;
use newsroom::{Config, build_state};

#[test]
fn flags_override_defaults() {
    let config = Config::try_parse_from([
        "newsroom",
        "--addr",
        "0.0.0.0:8080",
        "--backend",
        "Ollama",
        "--story-model",
        "llama3",
        "--utility-model",
        "llama3:8b",
        "--request-timeout",
        "30",
    ])
    .unwrap();

    assert_eq!(config.addr.port(), 8080);
    assert_eq!(config.backend, Backend::Ollama);
    let backend = config.backend_settings();
    assert_eq!(backend.timeout, Duration::from_secs(30));
    let pipeline = config.pipeline_settings();
    assert_eq!(pipeline.story_model, "llama3");
    assert_eq!(pipeline.utility_model, "llama3:8b");
}

#[test]
fn unknown_backend_is_rejected() {
    assert!(Config::try_parse_from(["newsroom", "--backend", "bard"]).is_err());
}

#[test]
fn openai_backend_requires_a_key() {
    let mut config = Config::try_parse_from(["newsroom", "--backend", "openai"]).unwrap();
    config.openai_api_key = Some("   ".into());
    assert!(build_state(&config).is_err());

    config.openai_api_key = Some("sk-test".into());
    assert!(build_state(&config).is_ok());
}

#[test]
fn data_dir_selects_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::try_parse_from([
        "newsroom",
        "--backend",
        "ollama",
        "--data-dir",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();
    assert_eq!(config.data_dir.as_deref(), Some(dir.path()));
    assert!(build_state(&config).is_ok());
}
