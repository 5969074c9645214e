use std::fs;
use std::path::PathBuf;

use pushkit::config::{load_early_logging, PushConfig};

fn temp_config(name: &str, content: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("pushkit-{}-{}", std::process::id(), name));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn toml_file_overrides_defaults() {
    let path = temp_config(
        "full.toml",
        r#"
[gateway]
url = "https://gateway.example/notify"
device_token = "TOKEN"

[device]
app_id = "com.example.app_app"
icon = "custom-icon"

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = PushConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.gateway.url, "https://gateway.example/notify");
    assert_eq!(config.gateway.device_token.as_deref(), Some("TOKEN"));
    assert_eq!(config.device.app_id, "com.example.app_app");
    assert_eq!(config.device.icon, "custom-icon");
    assert_eq!(config.log_level, "debug");

    fs::remove_file(path).ok();
}

#[test]
fn early_logging_reads_level_and_format() {
    let path = temp_config(
        "logging.toml",
        "[logging]\nlevel = \"trace\"\nformat = \"json\"\n",
    );

    let early = load_early_logging(path.to_str());
    assert_eq!(early.level.as_deref(), Some("trace"));
    assert_eq!(early.format.as_deref(), Some("json"));

    fs::remove_file(path).ok();
}

#[test]
fn early_logging_defaults_when_file_missing() {
    let early = load_early_logging(Some("/nonexistent/pushkit.toml"));
    assert!(early.level.is_none());
    assert!(early.format.is_none());
}

#[test]
fn early_logging_defaults_when_section_absent() {
    let path = temp_config("nologging.toml", "[gateway]\nurl = \"https://g.example\"\n");

    let early = load_early_logging(path.to_str());
    assert!(early.level.is_none());
    assert!(early.format.is_none());

    fs::remove_file(path).ok();
}
