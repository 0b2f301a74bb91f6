// ── Core error types ──
//
// User-facing errors from geoblink-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<geoblink_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Not authenticated -- run login first")]
    NotAuthenticated,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach tracker platform: {reason}")]
    ConnectionFailed { reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── Sync errors ──────────────────────────────────────────────────
    #[error("Device sync failed: {message}")]
    SyncFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Platform error: {message}")]
    Api {
        message: String,
        /// The platform-specific error code (e.g. "403").
        code: Option<String>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<geoblink_api::Error> for CoreError {
    fn from(err: geoblink_api::Error) -> Self {
        match err {
            geoblink_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            geoblink_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            geoblink_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                    }
                }
            }
            geoblink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            geoblink_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            geoblink_api::Error::Platform { code, message } => CoreError::Api {
                message,
                code: Some(code),
            },
            geoblink_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
