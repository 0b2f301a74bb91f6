//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use geoblink_config::ConfigError;
use geoblink_core::CoreError;

/// Exit codes for process termination.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the tracker platform")]
    #[diagnostic(
        code(geoblink::connection_failed),
        help(
            "Check that the server URL is correct and reachable.\n\
             Reason: {reason}\n\
             Self-hosted platform with a self-signed cert? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(geoblink::auth_failed),
        help("Run: geoblink login")
    )]
    AuthFailed { message: String },

    #[error("Not logged in on profile '{profile}'")]
    #[diagnostic(
        code(geoblink::not_logged_in),
        help(
            "Run: geoblink login --profile {profile}\n\
             Or set GEOBLINK_TOKEN and GEOBLINK_HASH for scripted use."
        )
    )]
    NotLoggedIn { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Device '{identifier}' not found")]
    #[diagnostic(
        code(geoblink::not_found),
        help("Run: geoblink devices list to see available devices")
    )]
    DeviceNotFound { identifier: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Platform error ({code}): {message}")]
    #[diagnostic(code(geoblink::api_error))]
    ApiError { code: String, message: String },

    #[error("Device sync failed: {message}")]
    #[diagnostic(code(geoblink::sync_failed))]
    SyncFailed { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(geoblink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No server configured")]
    #[diagnostic(
        code(geoblink::no_server),
        help(
            "Pass --server <URL>, set GEOBLINK_SERVER, or add a profile to:\n\
             {path}"
        )
    )]
    NoServer { path: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(geoblink::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(geoblink::config))]
    Config(#[from] ConfigError),

    // ── IO / prompts ─────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Prompt failed: {0}")]
    #[diagnostic(
        code(geoblink::prompt),
        help("Interactive prompts need a terminal; pass arguments directly instead.")
    )]
    Prompt(#[from] dialoguer::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NotLoggedIn { .. } => exit_code::AUTH,
            Self::DeviceNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Config(ConfigError::NoSession { .. }) => exit_code::AUTH,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotAuthenticated => CliError::NotLoggedIn {
                profile: "current".into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },

            CoreError::DeviceNotFound { identifier } => CliError::DeviceNotFound { identifier },

            CoreError::SyncFailed { message } => CliError::SyncFailed { message },

            CoreError::Api { message, code } => CliError::ApiError {
                code: code.unwrap_or_default(),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

impl From<geoblink_api::Error> for CliError {
    fn from(err: geoblink_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exit_codes_match_error_classes() {
        let auth: CliError = CoreError::NotAuthenticated.into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let missing: CliError = CoreError::DeviceNotFound {
            identifier: "x".into(),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let conn: CliError = CoreError::ConnectionFailed {
            reason: "refused".into(),
        }
        .into();
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);
    }
}
