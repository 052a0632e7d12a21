use std::{
    collections::HashMap,
    fmt, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "lookup.toml";

/// What to do with a lookup result that arrives after a newer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrdering {
    /// Results of superseded lookups are dropped.
    #[default]
    LatestOnly,
    /// Whatever resolves last is shown, even if it was submitted first.
    LastResolvedWins,
}

impl FromStr for ResponseOrdering {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "latest_only" => Ok(Self::LatestOnly),
            "last_resolved_wins" => Ok(Self::LastResolvedWins),
            other => Err(format!(
                "unknown response ordering '{other}' (expected latest_only or last_resolved_wins)"
            )),
        }
    }
}

impl fmt::Display for ResponseOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LatestOnly => f.write_str("latest_only"),
            Self::LastResolvedWins => f.write_str("last_resolved_wins"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub currency_symbol: String,
    pub response_ordering: ResponseOrdering,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            currency_symbol: "$".into(),
            response_ordering: ResponseOrdering::LatestOnly,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Defaults, then the config file, then environment overrides.
///
/// An explicit `path` must exist; without one, `lookup.toml` in the working
/// directory is used when present.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut settings = Settings::default();

    match path {
        Some(path) => settings.apply_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                settings.apply_file(default_path)?;
            }
        }
    }

    settings.apply_env(|key| std::env::var(key).ok())?;
    Ok(settings)
}

impl Settings {
    pub fn apply_file(&mut self, path: &Path) -> Result<(), SettingsError> {
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_cfg: HashMap<String, String> =
            toml::from_str(&raw).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), keys = file_cfg.len(), "loaded lookup config file");

        if let Some(v) = file_cfg.get("server_url") {
            self.server_url = v.clone();
        }
        if let Some(v) = file_cfg.get("currency_symbol") {
            self.currency_symbol = v.clone();
        }
        if let Some(v) = file_cfg.get("response_ordering") {
            self.response_ordering = parse_ordering("response_ordering", v)?;
        }
        Ok(())
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PRODUCT_LOOKUP_SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = lookup("APP__SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = lookup("APP__CURRENCY_SYMBOL") {
            self.currency_symbol = v;
        }
        if let Some(v) = lookup("APP__RESPONSE_ORDERING") {
            self.response_ordering = parse_ordering("APP__RESPONSE_ORDERING", &v)?;
        }
        Ok(())
    }

    /// Command line flags win over everything else.
    pub fn with_server_url(mut self, server_url: Option<String>) -> Self {
        if let Some(server_url) = server_url {
            self.server_url = server_url;
        }
        self
    }
}

fn parse_ordering(key: &str, value: &str) -> Result<ResponseOrdering, SettingsError> {
    value
        .parse()
        .map_err(|reason| SettingsError::InvalidValue {
            key: key.to_string(),
            reason,
        })
}
