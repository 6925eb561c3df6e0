//! Tests for loading client configuration.

use std::io::Write;
use std::time::Duration;

use renju_client::{ClientConfig, Difficulty, Mode};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
fn test_load_from_file() {
    let file = write_config(
        r#"
server_url = "http://games.local:9000"
mode = "pvp"
difficulty = "intermediate"
request_timeout_secs = 3
"#,
    );

    let config = ClientConfig::from_file(file.path()).expect("valid config");
    assert_eq!(config.server_url(), "http://games.local:9000");
    assert_eq!(config.mode(), Mode::HumanVsHuman);
    assert_eq!(config.difficulty(), &Difficulty::intermediate());
    assert_eq!(config.request_timeout(), Duration::from_secs(3));
}

#[test]
fn test_partial_file_uses_defaults() {
    let file = write_config("difficulty = \"intermediate\"\n");

    let config = ClientConfig::from_file(file.path()).expect("valid config");
    assert_eq!(config.server_url(), "http://127.0.0.1:8000");
    assert_eq!(config.mode(), Mode::HumanVsAutomated);
    assert_eq!(config.request_timeout_secs(), 10);
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = ClientConfig::load(dir.path().join("absent.toml")).expect("defaults");

    assert_eq!(config.mode(), Mode::HumanVsAutomated);
    assert_eq!(config.difficulty(), &Difficulty::beginner());
    assert_eq!(config.request_timeout(), Duration::from_secs(10));
}

#[test]
fn test_invalid_values_rejected() {
    for content in [
        "server_url = \"localhost:8000\"\n",
        "request_timeout_secs = 0\n",
        "difficulty = \"  \"\n",
        "mode = \"solo\"\n",
        "server_url = \n",
    ] {
        let file = write_config(content);
        assert!(
            ClientConfig::from_file(file.path()).is_err(),
            "accepted {:?}",
            content
        );
    }
}

#[test]
fn test_unreadable_file_reports_path_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = ClientConfig::from_file(dir.path().join("nope.toml")).expect_err("missing");
    assert!(err.message.contains("Failed to read config file"));
}

#[test]
fn test_overrides() {
    let config = ClientConfig::default()
        .with_server_url("https://renju.example.org")
        .expect("valid url")
        .with_mode(Mode::HumanVsHuman)
        .with_difficulty(Difficulty::intermediate())
        .expect("valid difficulty");

    assert_eq!(config.server_url(), "https://renju.example.org");
    let settings = config.game_settings();
    assert_eq!(settings.mode(), Mode::HumanVsHuman);
    assert_eq!(settings.difficulty(), &Difficulty::intermediate());

    assert!(ClientConfig::default().with_server_url("ftp://nope").is_err());
}

#[test]
fn test_blank_difficulty_override_rejected() {
    let err = ClientConfig::default()
        .with_difficulty(Difficulty::new(""))
        .expect_err("blank difficulty");
    assert!(err.message.contains("difficulty must not be empty"));

    assert!(
        ClientConfig::default()
            .with_difficulty(Difficulty::new(" \t"))
            .is_err()
    );
}
