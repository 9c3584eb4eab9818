use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use shared::domain::{EndpointPair, UserIdentity, UserSlot};
use tracing::{debug, warn};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const CONFIG_FILE_NAME: &str = "exchange.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub user1: EndpointPair,
    pub user2: EndpointPair,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user1: EndpointPair::default_for(UserSlot::User1),
            user2: EndpointPair::default_for(UserSlot::User2),
        }
    }
}

/// Shape of `exchange.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub user1: Option<EndpointPair>,
    pub user2: Option<EndpointPair>,
}

impl Settings {
    pub fn endpoints(&self, slot: UserSlot) -> &EndpointPair {
        match slot {
            UserSlot::User1 => &self.user1,
            UserSlot::User2 => &self.user2,
        }
    }

    pub fn identity(&self, slot: UserSlot) -> UserIdentity {
        UserIdentity::new(slot, self.endpoints(slot).clone())
    }

    /// A zero timeout would make every call fail; it falls back to the default.
    pub fn request_timeout(&self) -> Duration {
        if self.request_timeout_secs == 0 {
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.request_timeout_secs)
        }
    }

    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        parse_base_url(&self.base_url)
    }

    pub fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.base_url {
            self.base_url = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        if let Some(v) = file.user1 {
            self.user1 = v;
        }
        if let Some(v) = file.user2 {
            self.user2 = v;
        }
    }

    /// Applies environment overrides through `lookup` so callers (and tests)
    /// decide where variables come from.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("EXCHANGE_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("APP__BASE_URL") {
            self.base_url = v;
        }

        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
            match v.trim().parse::<u64>() {
                Ok(parsed) => self.request_timeout_secs = parsed,
                Err(err) => warn!(value = %v, "ignoring APP__REQUEST_TIMEOUT_SECS: {err}"),
            }
        }
    }
}

pub fn read_settings_file(path: &Path) -> Result<FileSettings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::ParseFile {
        path: path.display().to_string(),
        source,
    })
}

/// Defaults, then the config file, then the process environment.
///
/// An `explicit` path must exist and parse. Otherwise the first existing entry
/// of `search_paths` is used; a broken file there is logged and skipped.
pub fn load_settings(
    explicit: Option<&Path>,
    search_paths: &[PathBuf],
) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    if let Some(path) = explicit {
        settings.apply_file(read_settings_file(path)?);
        debug!(path = %path.display(), "loaded exchange config");
    } else {
        for candidate in search_paths.iter().filter(|path| path.is_file()) {
            match read_settings_file(candidate) {
                Ok(file) => {
                    settings.apply_file(file);
                    debug!(path = %candidate.display(), "loaded exchange config");
                    break;
                }
                Err(err) => warn!("skipping config file: {err}"),
            }
        }
    }

    settings.apply_env(|name| std::env::var(name).ok());
    Ok(settings)
}

fn normalize_base_url(raw_base_url: &str) -> String {
    let raw_base_url = raw_base_url.trim();

    if raw_base_url.is_empty() {
        return format!("{DEFAULT_BASE_URL}/");
    }

    // Url::join replaces the last path segment unless the base ends with '/'.
    if raw_base_url.ends_with('/') {
        raw_base_url.to_string()
    } else {
        format!("{raw_base_url}/")
    }
}

pub fn parse_base_url(raw_base_url: &str) -> Result<Url, ConfigError> {
    let normalized = normalize_base_url(raw_base_url);
    let url = Url::parse(&normalized).map_err(|source| ConfigError::InvalidBaseUrl {
        base_url: raw_base_url.to_string(),
        source,
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::UnsupportedBaseUrl(raw_base_url.to_string()));
    }
    Ok(url)
}

/// Resolves an endpoint name beneath the base URL. Endpoint names are plain
/// relative paths; anything carrying a scheme, query or fragment is refused.
pub fn endpoint_url(base_url: &Url, slot: UserSlot, endpoint: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEndpoint {
        slot,
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = endpoint.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(invalid("endpoint name is empty"));
    }
    if trimmed.contains(|c: char| matches!(c, ':' | '?' | '#')) {
        return Err(invalid("expected a relative path without scheme, query or fragment"));
    }

    base_url
        .join(trimmed)
        .map_err(|err| invalid(&err.to_string()))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
