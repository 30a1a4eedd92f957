use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::api::LOGIN_PATH;
use crate::config::{ClientConfig, Credentials};
use crate::digest::challenge_response;
use crate::error::{FritzError, Result};
use crate::fritz_xml;
use crate::transport::Transport;

mod store;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

/// The sid the fritz box reports when there is no session.
pub const NO_SESSION: &str = "0000000000000000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub host: String,
    pub token: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,
}

impl Session {
    /// A session without token, issued "never".
    pub fn empty(host: impl ToString) -> Self {
        Self {
            host: host.to_string(),
            token: None,
            issued_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    pub fn new(host: impl ToString, token: impl ToString, issued_at: DateTime<Utc>) -> Self {
        Self {
            host: host.to_string(),
            token: Some(token.to_string()),
            issued_at,
        }
    }

    /// The token, if it is a real session id.
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .filter(|token| !token.is_empty() && *token != NO_SESSION)
    }

    pub fn is_expired(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now.signed_duration_since(self.issued_at) >= max_age
    }

    pub fn is_valid(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        self.token().is_some() && !self.is_expired(now, max_age)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Valid,
    /// Had a token that is too old now. Needs a new login just like
    /// `Unauthenticated`.
    Expired,
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

/// First step of the login: requests a fresh challenge.
pub fn obtain_challenge(transport: &dyn Transport) -> Result<String> {
    let xml = transport.get(LOGIN_PATH, &[])?;
    let info = fritz_xml::parse_session_info(&xml)?;
    info.challenge()
        .map(ToString::to_string)
        .ok_or(FritzError::ChallengeMissing)
}

/// Runs both login steps and returns the new session id.
pub fn authenticate(transport: &dyn Transport, credentials: &Credentials) -> Result<String> {
    let challenge = obtain_challenge(transport)?;
    let response = challenge_response(&challenge, &credentials.password);
    let xml = transport.get(
        LOGIN_PATH,
        &[
            ("username", credentials.username.as_str()),
            ("response", response.as_str()),
        ],
    )?;
    let info = fritz_xml::parse_session_info(&xml)?;

    match info.sid() {
        Some(sid) if sid != NO_SESSION => Ok(sid.to_string()),
        _ => match info.block_time() {
            0 => Err(FritzError::InvalidToken),
            secs => Err(FritzError::LoginBlocked(secs)),
        },
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

/// Owns the one session of a client. Logins are serialized: whoever comes
/// second waits for the running login and takes its result.
pub struct SessionManager {
    host: String,
    credentials: Credentials,
    max_age: chrono::Duration,
    store: Box<dyn SessionStore>,
    session: RwLock<Session>,
    login: Mutex<()>,
    authenticating: AtomicBool,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("host", &self.host)
            .field("credentials", &self.credentials)
            .field("state", &self.state(Utc::now()))
            .finish()
    }
}

impl SessionManager {
    pub fn new(
        config: &ClientConfig,
        credentials: Credentials,
        store: impl SessionStore + 'static,
    ) -> Self {
        let host = config.host.clone();
        let session = match store.load() {
            Ok(Some(session)) if session.host == host => session,
            Ok(Some(session)) => {
                debug!("ignoring stored session for host {}", session.host);
                Session::empty(&host)
            }
            Ok(None) => Session::empty(&host),
            Err(err) => {
                warn!("cannot load stored session: {err}");
                Session::empty(&host)
            }
        };
        Self {
            host,
            credentials,
            max_age: config.max_session_age,
            store: Box::new(store),
            session: RwLock::new(session),
            login: Mutex::new(()),
            authenticating: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> Session {
        self.session.read().clone()
    }

    pub fn state(&self, now: DateTime<Utc>) -> SessionState {
        if self.authenticating.load(Ordering::SeqCst) {
            return SessionState::Authenticating;
        }
        let session = self.session.read();
        match session.token() {
            None => SessionState::Unauthenticated,
            Some(_) if session.is_expired(now, self.max_age) => SessionState::Expired,
            Some(_) => SessionState::Valid,
        }
    }

    /// The current token if it is still valid, without logging in.
    pub fn valid_token(&self, now: DateTime<Utc>) -> Option<String> {
        let session = self.session.read();
        if session.is_valid(now, self.max_age) {
            session.token().map(ToString::to_string)
        } else {
            None
        }
    }

    /// Returns a valid token, logging in if needed.
    pub fn token(&self, transport: &dyn Transport) -> Result<String> {
        if let Some(token) = self.valid_token(Utc::now()) {
            return Ok(token);
        }
        let _login = self.login.lock();
        // the login we waited for might have produced a token already
        if let Some(token) = self.valid_token(Utc::now()) {
            return Ok(token);
        }
        self.login_locked(transport)
    }

    /// Forces a new login, regardless of the current state.
    pub fn authenticate(&self, transport: &dyn Transport) -> Result<String> {
        let _login = self.login.lock();
        self.login_locked(transport)
    }

    /// Drops `stale` if it is still the current token. A token that was
    /// refreshed in the meantime is kept.
    pub fn invalidate_token(&self, stale: &str) {
        let _login = self.login.lock();
        let is_current = self.session.read().token.as_deref() == Some(stale);
        if is_current {
            warn!("session for {} is no longer accepted", self.host);
            self.replace(Session::empty(&self.host));
        }
    }

    // -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

    fn login_locked(&self, transport: &dyn Transport) -> Result<String> {
        let _authenticating = AuthenticatingGuard::new(&self.authenticating);
        debug!("logging in to {} as {:?}", self.host, self.credentials.username);
        match authenticate(transport, &self.credentials) {
            Ok(token) => {
                info!("logged in to {}", self.host);
                self.replace(Session::new(&self.host, &token, Utc::now()));
                Ok(token)
            }
            Err(err) => {
                warn!("login to {} failed: {err}", self.host);
                self.replace(Session::empty(&self.host));
                Err(err)
            }
        }
    }

    fn replace(&self, session: Session) {
        if let Err(err) = self.store.save(&session) {
            warn!("cannot store session: {err}");
        }
        *self.session.write() = session;
    }
}

struct AuthenticatingGuard<'a>(&'a AtomicBool);

impl<'a> AuthenticatingGuard<'a> {
    fn new(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for AuthenticatingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
