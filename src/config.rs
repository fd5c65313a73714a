use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::timezone::EventTimezone;
use crate::utils;

pub const DEFAULT_COMMUNITY_ID: i64 = 87677042;
pub const DEFAULT_POST_COUNT: u32 = 20;
const MAX_POST_COUNT: u32 = 100;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 25;
const DEFAULT_API_VERSION: &str = "5.131";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("credentials file not found (looked in: {0})")]
    NotFound(String),
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed credentials: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramCredentials {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VkCredentials {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    #[serde(deserialize_with = "string_or_number")]
    pub app_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Pre-issued token; when present the password login is skipped.
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub community_id: i64,
    pub post_count: u32,
    pub timezone: Option<String>,
    pub http_timeout_secs: u64,
    pub poll_timeout_secs: u64,
    pub refresh_interval_minutes: Option<u64>,
    pub api_version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            community_id: DEFAULT_COMMUNITY_ID,
            post_count: DEFAULT_POST_COUNT,
            timezone: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            refresh_interval_minutes: None,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CredentialsFile {
    telegram_credentials: TelegramCredentials,
    vk_credentials: VkCredentials,
    #[serde(default)]
    settings: Settings,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramCredentials,
    pub vk: VkCredentials,
    pub settings: Settings,
    pub timezone: EventTimezone,
}

impl AppConfig {
    /// Loads credentials from the first existing candidate path and applies
    /// `WEEK_EVENTS_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = utils::credentials_path().ok_or_else(|| {
            let looked = utils::credentials_candidates()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            ConfigError::NotFound(looked)
        })?;
        tracing::debug!(path = %path.display(), "loading credentials");
        Self::from_path(&path, |key| std::env::var(key).ok())
    }

    pub fn from_path<F>(path: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents, env)
    }

    pub fn from_json<F>(contents: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: CredentialsFile = serde_json::from_str(contents)?;
        let mut settings = file.settings;
        apply_env_overrides(&mut settings, env);
        validate(&file.telegram_credentials, &file.vk_credentials, &settings)?;

        let timezone = EventTimezone::parse(settings.timezone.as_deref().unwrap_or_default())
            .map_err(|err| ConfigError::Invalid(format!("timezone: {err}")))?;

        Ok(Self {
            telegram: file.telegram_credentials,
            vk: file.vk_credentials,
            settings,
            timezone,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.http_timeout_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.poll_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.settings
            .refresh_interval_minutes
            .filter(|minutes| *minutes > 0)
            .map(|minutes| Duration::from_secs(minutes * 60))
    }
}

fn apply_env_overrides<F>(settings: &mut Settings, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(id) = env("WEEK_EVENTS_COMMUNITY_ID").and_then(|s| s.trim().parse::<i64>().ok()) {
        settings.community_id = id;
    }
    if let Some(count) = env("WEEK_EVENTS_POST_COUNT").and_then(|s| s.trim().parse::<u32>().ok()) {
        settings.post_count = count;
    }
    if let Some(tz) = env("WEEK_EVENTS_TIMEZONE") {
        settings.timezone = Some(tz);
    }
    if let Some(minutes) =
        env("WEEK_EVENTS_REFRESH_MINUTES").and_then(|s| s.trim().parse::<u64>().ok())
    {
        settings.refresh_interval_minutes = Some(minutes);
    }
}

fn validate(
    telegram: &TelegramCredentials,
    vk: &VkCredentials,
    settings: &Settings,
) -> Result<(), ConfigError> {
    if telegram.token.trim().is_empty() {
        return Err(ConfigError::Invalid("telegram token is required".into()));
    }
    let has_token = vk
        .access_token
        .as_deref()
        .is_some_and(|token| !token.trim().is_empty());
    if !has_token && (vk.login.trim().is_empty() || vk.password.is_empty()) {
        return Err(ConfigError::Invalid(
            "vk login and password are required without an access token".into(),
        ));
    }
    if vk.app_id.trim().is_empty() {
        return Err(ConfigError::Invalid("vk app_id is required".into()));
    }
    if settings.community_id <= 0 {
        return Err(ConfigError::Invalid(
            "community_id must be a positive group id".into(),
        ));
    }
    if settings.post_count == 0 || settings.post_count > MAX_POST_COUNT {
        return Err(ConfigError::Invalid(format!(
            "post_count must be between 1 and {MAX_POST_COUNT}"
        )));
    }
    if settings.http_timeout_secs == 0 {
        return Err(ConfigError::Invalid("http_timeout_secs must be positive".into()));
    }
    Ok(())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
