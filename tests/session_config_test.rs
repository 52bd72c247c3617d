//! Loading session configuration from disk.

use std::io::Write;
use super_tictactoe::SessionConfig;

#[test]
fn test_config_file_loaded() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(
        file,
        r#"
store_dir = "matches"
move_timeout_secs = 120
max_moves_per_minute = 20
min_move_interval_ms = 250
throttle_enabled = true
write_retries = 5
"#
    )
    .expect("written");

    let config = SessionConfig::from_file(file.path()).expect("loaded");
    assert_eq!(config.store_dir().to_str(), Some("matches"));
    assert_eq!(*config.move_timeout_secs(), 120);
    assert_eq!(*config.max_moves_per_minute(), 20);
    assert_eq!(config.min_move_interval(), chrono::Duration::milliseconds(250));
    assert!(*config.throttle_enabled());
    assert_eq!(*config.write_retries(), 5);
}

#[test]
fn test_missing_file_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = SessionConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.starts_with("Failed to read config file"));
}

#[test]
fn test_unknown_keys_ignored() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "theme = \"dark\"\nwrite_retries = 2").expect("written");
    let config = SessionConfig::from_file(file.path()).expect("loaded");
    assert_eq!(*config.write_retries(), 2);
}
