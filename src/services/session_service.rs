use axum::http::{HeaderMap, HeaderValue};
use log::debug;

use crate::config::Config;
use crate::errors::WikiError;
use crate::security::CookieSigner;
use crate::types::SessionData;
use crate::utils::{cookie_value, set_cookie};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Service keeping per-browser session data in a signed cookie
#[derive(Clone)]
pub struct SessionService {
    signer: CookieSigner,
}

impl SessionService {
    /// Create a new session service
    pub fn new(config: &Config) -> Self {
        Self {
            signer: CookieSigner::new(&config.session_secret, "session", config.session_timeout()),
        }
    }

    /// Load the session; a missing, forged or expired cookie starts a fresh one
    pub fn load(&self, headers: &HeaderMap) -> SessionData {
        match cookie_value(headers, SESSION_COOKIE).and_then(|raw| self.signer.verify(&raw)) {
            Some(session) => session,
            None => {
                debug!("Starting new session");
                SessionData::default()
            }
        }
    }

    /// Cookie directive persisting the session
    pub fn save(&self, session: &SessionData) -> Result<HeaderValue, WikiError> {
        let value = self.signer.sign(session)?;
        set_cookie(SESSION_COOKIE, &value, self.signer.max_age())
    }

    /// Increment the visit counter and return the new value with the cookie to send back
    pub fn bump_counter(&self, headers: &HeaderMap) -> Result<(u64, HeaderValue), WikiError> {
        let mut session = self.load(headers);
        session.counter += 1;
        let cookie = self.save(&session)?;
        Ok((session.counter, cookie))
    }
}
