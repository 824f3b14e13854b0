//! Server-held session identity.
//!
//! A session is created the first time a user is written into it, and dropped
//! as soon as its user is cleared. Idle sessions expire after the configured
//! TTL; expired entries are swept whenever a new session is inserted.

mod token;

pub use token::SESSION_COOKIE_NAME;

use anyhow::{Context, Result};
use axum::http::{HeaderMap, HeaderValue};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use token::{
    TokenHash, clear_session_cookie, extract_session_token, generate_session_token,
    hash_session_token, session_cookie,
};

const DEFAULT_SESSION_TTL_SECONDS: u64 = 12 * 60 * 60;

/// Which username, if any, the session is authenticated as.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    user: Option<String>,
}

impl SessionIdentity {
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn set_user(&mut self, username: &str) {
        self.user = Some(username.to_string());
    }

    pub fn clear(&mut self) {
        self.user = None;
    }
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    ttl_seconds: u64,
    cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: u64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}

struct SessionEntry {
    identity: SessionIdentity,
    expires_at: Instant,
}

/// A request's view of its session: the cookie token (if any) and the identity.
pub struct Session {
    token: Option<String>,
    // User the token was bound to when loaded; `None` for unknown tokens.
    bound_user: Option<String>,
    pub identity: SessionIdentity,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("identity", &self.identity)
            .finish()
    }
}

impl Session {
    fn anonymous(token: Option<String>) -> Self {
        Self {
            token,
            bound_user: None,
            identity: SessionIdentity::default(),
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.identity.user()
    }

    /// Bind the identity to a new token on the next save, dropping the old one.
    pub fn rotate(&mut self) {
        self.bound_user = None;
    }
}

/// In-memory session table keyed by token hash.
#[derive(Clone)]
pub struct SessionStore {
    config: SessionConfig,
    sessions: Arc<RwLock<HashMap<TokenHash, SessionEntry>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(self.config.ttl_seconds)
    }

    /// Resolve the request cookie into a session.
    ///
    /// Unknown or expired tokens yield an anonymous session that keeps the
    /// token, so saving it can clear the stale cookie.
    pub async fn load(&self, headers: &HeaderMap) -> Session {
        let Some(token) = extract_session_token(headers) else {
            return Session::anonymous(None);
        };

        let hash = hash_session_token(&token);
        let now = Instant::now();
        let identity = {
            let sessions = self.sessions.read().await;
            sessions
                .get(&hash)
                .filter(|entry| entry.expires_at > now)
                .map(|entry| entry.identity.clone())
        };

        match identity {
            Some(identity) => Session {
                token: Some(token),
                bound_user: identity.user.clone(),
                identity,
            },
            None => Session::anonymous(Some(token)),
        }
    }

    /// Persist the session and return the `Set-Cookie` header it needs, if any.
    ///
    /// - user unchanged on a live token: refresh its expiry if the entry still
    ///   exists, no cookie;
    /// - user newly set, changed or rotated: bind a fresh token and issue a
    ///   cookie (a token presented by the client is never promoted);
    /// - user cleared: drop the session and expire the cookie.
    ///
    /// # Errors
    /// Returns an error if the TTL overflows the clock or a fresh token and
    /// cookie cannot be produced.
    pub async fn save(&self, session: Session) -> Result<Option<HeaderValue>> {
        let Session {
            token,
            bound_user,
            identity,
        } = session;
        let expires_at = Instant::now()
            .checked_add(self.ttl())
            .context("session TTL out of range")?;

        if identity.user.is_none() {
            let Some(token) = token else {
                return Ok(None);
            };
            self.destroy(&token).await;
            let cookie = clear_session_cookie(self.config.cookie_secure)
                .context("invalid session cookie")?;
            return Ok(Some(cookie));
        }

        if let Some(token) = &token {
            if bound_user.is_some() && bound_user == identity.user {
                // Only extend an entry that is still there: a concurrent
                // logout or rotation must not be undone by a stale copy.
                if let Some(entry) = self
                    .sessions
                    .write()
                    .await
                    .get_mut(&hash_session_token(token))
                {
                    entry.expires_at = expires_at;
                }
                return Ok(None);
            }
        }

        let fresh = generate_session_token()?;
        {
            let mut sessions = self.sessions.write().await;
            if let Some(old) = &token {
                sessions.remove(&hash_session_token(old));
            }
            let now = Instant::now();
            sessions.retain(|_, entry| entry.expires_at > now);
            sessions.insert(
                hash_session_token(&fresh),
                SessionEntry {
                    identity,
                    expires_at,
                },
            );
        }
        debug!("Session created");

        let cookie = session_cookie(&fresh, self.config.ttl_seconds, self.config.cookie_secure)
            .context("invalid session cookie")?;
        Ok(Some(cookie))
    }

    async fn destroy(&self, token: &str) {
        if self
            .sessions
            .write()
            .await
            .remove(&hash_session_token(token))
            .is_some()
        {
            debug!("Session destroyed");
        }
    }

    /// Number of live sessions (expired ones may linger until the next sweep).
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
