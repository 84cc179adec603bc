use super::{load_session_file, parse_api_url, settings_from, Settings};

use std::{
    collections::HashMap,
    env, fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use client_core::load_session_user;
use shared::domain::UserType;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    assert_eq!(settings_from(None, env_from(&[])), Settings::default());
}

#[test]
fn file_values_override_defaults() {
    let file = r#"
api_url = "https://bills.example.test"
session_path = "/tmp/billed-session.json"
modal_width = "1000"
"#;
    let settings = settings_from(Some(file), env_from(&[]));

    assert_eq!(settings.api_url, "https://bills.example.test");
    assert_eq!(settings.session_path, PathBuf::from("/tmp/billed-session.json"));
    assert_eq!(settings.modal_width, 1000);
    assert_eq!(settings.api_token, None);
}

#[test]
fn numeric_file_values_are_read() {
    let file = r#"
api_url = "https://bills.example.test"
modal_width = 1000

[extra]
ignored = true
"#;
    let settings = settings_from(Some(file), env_from(&[]));

    assert_eq!(settings.api_url, "https://bills.example.test");
    assert_eq!(settings.modal_width, 1000);
}

#[test]
fn unusable_modal_width_keeps_the_rest_of_the_file() {
    let file = r#"
api_url = "https://bills.example.test"
modal_width = -5
"#;
    let settings = settings_from(Some(file), env_from(&[]));

    assert_eq!(settings.api_url, "https://bills.example.test");
    assert_eq!(settings.modal_width, Settings::default().modal_width);
}

#[test]
fn env_overrides_file() {
    let file = r#"api_url = "https://from-file.test""#;
    let settings = settings_from(
        Some(file),
        env_from(&[
            ("BILLED_API_URL", "https://from-env.test"),
            ("BILLED_API_TOKEN", "jwt"),
            ("APP__MODAL_WIDTH", "640"),
        ]),
    );

    assert_eq!(settings.api_url, "https://from-env.test");
    assert_eq!(settings.api_token.as_deref(), Some("jwt"));
    assert_eq!(settings.modal_width, 640);
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let settings = settings_from(
        None,
        env_from(&[
            ("BILLED_API_URL", "https://plain.test"),
            ("APP__API_URL", "https://prefixed.test"),
        ]),
    );
    assert_eq!(settings.api_url, "https://prefixed.test");
}

#[test]
fn malformed_file_and_env_values_are_ignored() {
    let settings = settings_from(
        Some("this is = not [toml"),
        env_from(&[("APP__MODAL_WIDTH", "wide")]),
    );
    assert_eq!(settings, Settings::default());
}

#[test]
fn api_url_requires_http_scheme() {
    assert!(parse_api_url("http://localhost:5678").is_ok());
    assert!(parse_api_url("https://bills.example.test/api").is_ok());
    assert!(parse_api_url("ftp://bills.example.test").is_err());
    assert!(parse_api_url("not a url").is_err());
}

#[test]
fn session_file_provides_session_user() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("billed_session_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("session.json");
    fs::write(
        &path,
        r#"{"user":"{\"type\":\"Employee\",\"email\":\"employee@test.tld\"}","jwt":"token"}"#,
    )
    .expect("write session");

    let session = load_session_file(&path).expect("session");
    let user = load_session_user(&session).expect("user");
    assert_eq!(user.user_type, UserType::Employee);
    assert_eq!(user.email, "employee@test.tld");

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn missing_session_file_is_an_error() {
    let err = load_session_file(&PathBuf::from("/definitely/not/here/session.json"))
        .expect_err("missing file");
    assert!(err.to_string().contains("failed to read session file"));
}
