// ── Session manager ──
//
// Holds the account's token pair in memory. Navigation uses
// `is_authenticated()` to pick its root; the sync path reads the tokens
// on every cycle so a logout mid-flight fails the next fetch cleanly.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::SecretString;

/// The platform token pair obtained from a confirmed SMS login.
#[derive(Clone)]
pub struct AuthTokens {
    pub token: SecretString,
    pub hash: SecretString,
}

impl AuthTokens {
    pub fn new(token: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            hash: SecretString::from(hash.into()),
        }
    }
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens").finish_non_exhaustive()
    }
}

/// Lock-free holder for the current session.
#[derive(Default)]
pub struct SessionManager {
    tokens: ArcSwapOption<AuthTokens>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct an already-authenticated session (tokens restored from
    /// the credential store).
    pub fn with_tokens(tokens: AuthTokens) -> Self {
        let session = Self::new();
        session.set_tokens(tokens);
        session
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.load().is_some()
    }

    pub fn tokens(&self) -> Option<Arc<AuthTokens>> {
        self.tokens.load_full()
    }

    pub fn set_tokens(&self, tokens: AuthTokens) {
        self.tokens.store(Some(Arc::new(tokens)));
    }

    /// Logout: drop the token pair.
    pub fn clear(&self) {
        self.tokens.store(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unauthenticated() {
        let session = SessionManager::new();
        assert!(!session.is_authenticated());
        assert!(session.tokens().is_none());
    }

    #[test]
    fn set_and_clear_round_trip() {
        let session = SessionManager::new();
        session.set_tokens(AuthTokens::new("tok", "hash"));
        assert!(session.is_authenticated());

        session.clear();
        assert!(!session.is_authenticated());
    }
}
