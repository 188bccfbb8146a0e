use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "studio.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_url: String,
    pub preview_url: String,
    pub session_id: Option<String>,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
    pub connect_timeout: Duration,
    /// Pause between a finished transcription and the move to the caption step.
    pub auto_advance_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8003".into(),
            preview_url: "http://localhost:8002".into(),
            session_id: None,
            request_timeout: Duration::from_secs(600),
            upload_timeout: Duration::from_secs(1800),
            connect_timeout: Duration::from_secs(10),
            auto_advance_delay: Duration::from_millis(3000),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    preview_url: Option<String>,
    session_id: Option<String>,
    request_timeout_secs: Option<u64>,
    upload_timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    auto_advance_delay_ms: Option<u64>,
}

/// Defaults, then `path` (or `studio.toml` in the working directory), then
/// environment overrides.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let mut settings = Settings::default();

    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => {
            if let Err(err) = apply_file_settings(&mut settings, &raw) {
                warn!(path = %path.display(), error = %err, "ignoring unreadable settings file");
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %path.display(), error = %err, "failed to read settings file"),
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn apply_file_settings(settings: &mut Settings, raw: &str) -> Result<(), toml::de::Error> {
    let file_cfg: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.preview_url {
        settings.preview_url = v;
    }
    if let Some(v) = file_cfg.session_id {
        settings.session_id = Some(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout = Duration::from_secs(v);
    }
    if let Some(v) = file_cfg.upload_timeout_secs {
        settings.upload_timeout = Duration::from_secs(v);
    }
    if let Some(v) = file_cfg.connect_timeout_secs {
        settings.connect_timeout = Duration::from_secs(v);
    }
    if let Some(v) = file_cfg.auto_advance_delay_ms {
        settings.auto_advance_delay = Duration::from_millis(v);
    }

    Ok(())
}

/// Later keys win, so `APP__*` overrides the short `STUDIO_*` spelling.
pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["STUDIO_SERVER_URL", "APP__SERVER_URL"] {
        if let Some(v) = lookup(key) {
            settings.server_url = v;
        }
    }

    if let Some(v) = lookup("APP__PREVIEW_URL") {
        settings.preview_url = v;
    }

    for key in ["STUDIO_SESSION_ID", "APP__SESSION_ID"] {
        if let Some(v) = lookup(key) {
            settings.session_id = Some(v);
        }
    }

    if let Some(secs) = parse_number(&lookup, "APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = parse_number(&lookup, "APP__UPLOAD_TIMEOUT_SECS") {
        settings.upload_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = parse_number(&lookup, "APP__CONNECT_TIMEOUT_SECS") {
        settings.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = parse_number(&lookup, "APP__AUTO_ADVANCE_DELAY_MS") {
        settings.auto_advance_delay = Duration::from_millis(ms);
    }
}

fn parse_number(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(key, value = %raw, "ignoring non-numeric override");
            None
        }
    }
}
