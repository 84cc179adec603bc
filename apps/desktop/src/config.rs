use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use client_core::MemorySessionStore;
use tracing::warn;
use url::Url;

pub const SETTINGS_FILE: &str = "billed.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub api_token: Option<String>,
    pub session_path: PathBuf,
    pub modal_width: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5678".into(),
            api_token: None,
            session_path: PathBuf::from("./session.json"),
            modal_width: 800,
        }
    }
}

pub fn load_settings() -> Settings {
    let raw = fs::read_to_string(SETTINGS_FILE).ok();
    settings_from(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file, then the environment.
pub fn settings_from(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match raw.parse::<toml::Table>() {
            Ok(table) => {
                let file_cfg = file_values(table);
                if let Some(v) = file_cfg.get("api_url") {
                    settings.api_url = v.clone();
                }
                if let Some(v) = file_cfg.get("api_token") {
                    settings.api_token = Some(v.clone());
                }
                if let Some(v) = file_cfg.get("session_path") {
                    settings.session_path = PathBuf::from(v);
                }
                if let Some(v) = file_cfg.get("modal_width") {
                    match v.parse::<u32>() {
                        Ok(width) => settings.modal_width = width,
                        Err(err) => {
                            warn!(value = %v, error = %err, "config: ignoring modal_width")
                        }
                    }
                }
            }
            Err(err) => warn!(error = %err, "config: ignoring unreadable {SETTINGS_FILE}"),
        }
    }

    if let Some(v) = env("BILLED_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("BILLED_API_TOKEN") {
        settings.api_token = Some(v);
    }

    if let Some(v) = env("BILLED_SESSION_PATH") {
        settings.session_path = PathBuf::from(v);
    }

    if let Some(v) = env("APP__MODAL_WIDTH") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.modal_width = parsed;
        }
    }

    settings
}

/// Top-level scalars of the settings file as strings; tables and arrays are
/// skipped.
fn file_values(table: toml::Table) -> HashMap<String, String> {
    table
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                _ => return None,
            };
            Some((key, value))
        })
        .collect()
}

pub fn parse_api_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid api url '{raw}'"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!("unsupported api url scheme '{other}' in '{raw}'")),
    }
}

/// Loads a local-storage dump: a JSON object of string entries.
pub fn load_session_file(path: &Path) -> anyhow::Result<MemorySessionStore> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read session file '{}'", path.display()))?;
    let entries: HashMap<String, String> = serde_json::from_str(&raw)
        .with_context(|| format!("session file '{}' is not a JSON object", path.display()))?;
    Ok(MemorySessionStore::from(entries))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
