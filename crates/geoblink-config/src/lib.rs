//! Shared configuration for geoblink tools.
//!
//! TOML profiles, session-token persistence (keyring + env), and URL
//! resolution. The CLI layers flag overrides on top; core never reads
//! config files itself.

use std::collections::HashMap;
use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use geoblink_core::AuthTokens;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no session stored for profile '{profile}' -- run login first")]
    NoSession { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("credential store error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named platform profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between refreshes in `watch` mode.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    30
}

/// A named platform profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Platform base URL (e.g. "https://api.geoblink.example").
    pub server: String,

    /// Account phone number, kept so `login` can be re-run without args.
    pub phone: Option<String>,

    /// Accept self-signed TLS certificates (self-hosted platforms).
    pub insecure: Option<bool>,

    /// Override request timeout.
    pub timeout: Option<u64>,

    /// Override watch-mode refresh interval.
    pub refresh_interval: Option<u64>,
}

impl Profile {
    /// Parse the profile's server URL.
    pub fn server_url(&self) -> Result<url::Url, ConfigError> {
        self.server.parse().map_err(|_| ConfigError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {}", self.server),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "geoblink", "geoblink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("geoblink");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("GEOBLINK_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Session persistence ─────────────────────────────────────────────
//
// The token pair lives in the system keyring, one entry per profile.
// `GEOBLINK_TOKEN` / `GEOBLINK_HASH` env vars override it for scripted
// use. Token and hash are stored newline-joined in a single entry.

const KEYRING_SERVICE: &str = "geoblink";

fn session_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/session"))
}

/// Persist the token pair for a profile.
pub fn store_session(profile_name: &str, token: &str, hash: &str) -> Result<(), ConfigError> {
    let entry = session_entry(profile_name)?;
    entry.set_password(&encode_session(token, hash))?;
    Ok(())
}

/// Restore the token pair for a profile, env vars taking precedence.
pub fn load_session(profile_name: &str) -> Result<AuthTokens, ConfigError> {
    if let (Ok(token), Ok(hash)) = (std::env::var("GEOBLINK_TOKEN"), std::env::var("GEOBLINK_HASH"))
    {
        return Ok(AuthTokens::new(token, hash));
    }

    let entry = session_entry(profile_name)?;
    let stored = entry.get_password().map_err(|_| ConfigError::NoSession {
        profile: profile_name.into(),
    })?;

    decode_session(&stored)
        .map(|(token, hash)| AuthTokens::new(token, hash))
        .ok_or_else(|| ConfigError::NoSession {
            profile: profile_name.into(),
        })
}

/// Forget the stored token pair. Missing entries are not an error.
pub fn clear_session(profile_name: &str) -> Result<(), ConfigError> {
    let entry = session_entry(profile_name)?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn encode_session(token: &str, hash: &str) -> String {
    format!("{token}\n{hash}")
}

fn decode_session(stored: &str) -> Option<(&str, &str)> {
    stored.split_once('\n')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn session_encoding_round_trips() {
        let stored = encode_session("tok-123", "hash-456");
        assert_eq!(decode_session(&stored), Some(("tok-123", "hash-456")));
    }

    #[test]
    fn malformed_session_is_rejected() {
        assert_eq!(decode_session("no-separator"), None);
    }

    #[test]
    fn default_config_has_a_default_profile_name() {
        let cfg = Config::default();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.defaults.timeout, 30);
    }

    #[test]
    fn profile_toml_round_trips() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "prod".into(),
            Profile {
                server: "https://api.geoblink.example".into(),
                phone: Some("+79990000000".into()),
                insecure: None,
                timeout: Some(10),
                refresh_interval: None,
            },
        );

        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        let prod = &parsed.profiles["prod"];
        assert_eq!(prod.server, "https://api.geoblink.example");
        assert_eq!(prod.timeout, Some(10));
        assert!(prod.server_url().is_ok());
    }

    #[test]
    fn invalid_server_url_is_a_validation_error() {
        let profile = Profile {
            server: "not a url".into(),
            phone: None,
            insecure: None,
            timeout: None,
            refresh_interval: None,
        };
        assert!(matches!(
            profile.server_url(),
            Err(ConfigError::Validation { .. })
        ));
    }
}
