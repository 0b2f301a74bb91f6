//! Resolves config, flags, and stored credentials into the wired object
//! graph the command handlers work with: client, session, store, sync.

use std::sync::Arc;
use std::time::Duration;

use geoblink_api::{TlsMode, TrackerClient, TransportConfig};
use geoblink_config::{self as config, Config};
use geoblink_core::{DeviceStore, DeviceSync, SessionManager};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything a connected command needs, resolved once at startup.
pub struct AppContext {
    pub profile_name: String,
    pub cfg: Config,
    pub client: Arc<TrackerClient>,
    pub session: Arc<SessionManager>,
    pub store: Arc<DeviceStore>,
    pub sync: Arc<DeviceSync>,
    pub refresh_interval: Duration,
}

impl AppContext {
    /// Build the context from the config file and CLI overrides.
    ///
    /// Stored session tokens are restored if present; commands that need
    /// authentication call [`require_auth`](Self::require_auth).
    pub fn build(global: &GlobalOpts) -> Result<Self, CliError> {
        let cfg = config::load_config_or_default();
        let profile_name = active_profile_name(global, &cfg);
        let profile = cfg.profiles.get(&profile_name);

        // --profile naming a missing profile is an error unless --server
        // makes the profile irrelevant.
        if global.profile.is_some() && profile.is_none() && global.server.is_none() {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
            });
        }

        let server = resolve_server(global, profile)?;
        let timeout = global
            .timeout
            .or_else(|| profile.and_then(|p| p.timeout))
            .unwrap_or(cfg.defaults.timeout);
        let insecure = global.insecure || profile.and_then(|p| p.insecure).unwrap_or(false);
        let refresh_interval = profile
            .and_then(|p| p.refresh_interval)
            .unwrap_or(cfg.defaults.refresh_interval);

        let transport = TransportConfig {
            tls: if insecure {
                TlsMode::DangerAcceptInvalid
            } else {
                TlsMode::System
            },
            timeout: Duration::from_secs(timeout),
        };
        let client = Arc::new(TrackerClient::new(server, &transport)?);

        let session = Arc::new(SessionManager::new());
        if let Ok(tokens) = config::load_session(&profile_name) {
            session.set_tokens(tokens);
        }

        let store = Arc::new(DeviceStore::new());
        let sync = Arc::new(DeviceSync::new(
            Arc::clone(&client) as Arc<dyn geoblink_core::DeviceSource>,
            Arc::clone(&store),
            Arc::clone(&session),
        ));

        Ok(Self {
            profile_name,
            cfg,
            client,
            session,
            store,
            sync,
            refresh_interval: Duration::from_secs(refresh_interval),
        })
    }

    /// Fail early with a profile-specific hint if no session is loaded.
    pub fn require_auth(&self) -> Result<(), CliError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NotLoggedIn {
                profile: self.profile_name.clone(),
            })
        }
    }

    /// The account phone stored in the active profile, if any.
    pub fn profile_phone(&self) -> Option<String> {
        self.cfg
            .profiles
            .get(&self.profile_name)
            .and_then(|p| p.phone.clone())
    }
}

/// Flag > config default > "default".
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

fn resolve_server(
    global: &GlobalOpts,
    profile: Option<&geoblink_config::Profile>,
) -> Result<url::Url, CliError> {
    if let Some(raw) = global.server.as_deref() {
        return raw.parse().map_err(|_| CliError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {raw}"),
        });
    }

    match profile {
        Some(profile) => Ok(profile.server_url()?),
        None => Err(CliError::NoServer {
            path: config::config_path().display().to_string(),
        }),
    }
}
