//! Known users and the signed authentication ticket.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, HeaderValue};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::UserConfig;
use crate::errors::WikiError;
use crate::security::password::{check_password, hash_password};
use crate::security::signing::CookieSigner;
use crate::utils::{clear_cookie, cookie_value, set_cookie};

/// Name of the authentication ticket cookie.
pub const AUTH_COOKIE: &str = "auth_tkt";

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub groups: Vec<String>,
}

/// Immutable table of known users, built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, UserRecord>,
}

impl UserDirectory {
    /// Build the directory, hashing any plain-text passwords
    pub fn from_config(users: &[UserConfig]) -> Result<Self, WikiError> {
        let mut table = HashMap::with_capacity(users.len());
        for user in users {
            let password_hash = match (&user.password_hash, &user.password) {
                (Some(hash), _) => hash.clone(),
                (None, Some(plain)) => hash_password(plain)?,
                (None, None) => {
                    return Err(WikiError::Config(format!(
                        "user '{}' has neither password nor password_hash",
                        user.username
                    )));
                }
            };
            let record = UserRecord {
                username: user.username.clone(),
                password_hash,
                groups: user.groups.clone(),
            };
            if table.insert(user.username.clone(), record).is_some() {
                return Err(WikiError::Config(format!("duplicate user '{}'", user.username)));
            }
        }
        info!("Loaded {} known users", table.len());
        Ok(Self { users: table })
    }

    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn groups(&self, username: &str) -> &[String] {
        self.users.get(username).map(|u| u.groups.as_slice()).unwrap_or(&[])
    }

    /// Check credentials; an unknown user and a wrong password look the same
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        match self.users.get(username) {
            Some(user) => check_password(password, &user.password_hash),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Who a request claims to be, after the ticket and user table agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub userid: String,
}

#[derive(Serialize, Deserialize)]
struct Ticket {
    userid: String,
}

/// Reads, issues and clears the authentication ticket cookie.
#[derive(Clone)]
pub struct IdentityResolver {
    signer: CookieSigner,
    users: Arc<UserDirectory>,
}

impl IdentityResolver {
    /// Create a new resolver
    pub fn new(secret: &str, timeout: Option<Duration>, users: Arc<UserDirectory>) -> Self {
        Self {
            signer: CookieSigner::new(secret, "auth_tkt", timeout),
            users,
        }
    }

    /// Resolve the request's identity; any defect in the ticket means anonymous
    pub fn identify(&self, headers: &HeaderMap) -> Option<Identity> {
        let raw = cookie_value(headers, AUTH_COOKIE)?;
        let ticket: Ticket = self.signer.verify(&raw)?;
        if !self.users.contains(&ticket.userid) {
            debug!("Ignoring ticket for unknown user '{}'", ticket.userid);
            return None;
        }
        Some(Identity { userid: ticket.userid })
    }

    /// Cookie directives that log `userid` in on subsequent requests
    pub fn remember(&self, userid: &str) -> Result<Vec<HeaderValue>, WikiError> {
        let value = self.signer.sign(&Ticket { userid: userid.to_string() })?;
        Ok(vec![set_cookie(AUTH_COOKIE, &value, self.signer.max_age())?])
    }

    /// Cookie directives that drop the ticket
    pub fn forget(&self) -> Vec<HeaderValue> {
        vec![clear_cookie(AUTH_COOKIE)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    fn directory() -> Arc<UserDirectory> {
        let users = vec![
            UserConfig {
                username: "editor".into(),
                password: Some("editor".into()),
                password_hash: None,
                groups: vec!["group:editors".into()],
            },
            UserConfig {
                username: "viewer".into(),
                password: None,
                password_hash: Some(hash_password("viewer").unwrap()),
                groups: vec![],
            },
        ];
        Arc::new(UserDirectory::from_config(&users).unwrap())
    }

    fn request_with(cookie: &HeaderValue) -> HeaderMap {
        // Set-Cookie "name=value; attrs" -> Cookie "name=value"
        let pair = cookie.to_str().unwrap().split(';').next().unwrap().to_string();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(&pair).unwrap());
        headers
    }

    #[test]
    fn directory_authenticates() {
        let users = directory();
        assert!(users.authenticate("editor", "editor"));
        assert!(users.authenticate("viewer", "viewer"));
        assert!(!users.authenticate("editor", "viewer"));
        assert!(!users.authenticate("nobody", "editor"));
        assert_eq!(users.groups("editor"), ["group:editors".to_string()]);
        assert!(users.groups("nobody").is_empty());
    }

    #[test]
    fn user_without_credentials_is_rejected() {
        let users = vec![UserConfig { username: "x".into(), password: None, password_hash: None, groups: vec![] }];
        assert!(matches!(UserDirectory::from_config(&users), Err(WikiError::Config(_))));
    }

    #[test]
    fn remembered_user_is_identified() {
        let resolver = IdentityResolver::new("s3cret", None, directory());
        let cookies = resolver.remember("editor").unwrap();
        let identity = resolver.identify(&request_with(&cookies[0]));
        assert_eq!(identity, Some(Identity { userid: "editor".into() }));
    }

    #[test]
    fn missing_or_foreign_ticket_is_anonymous() {
        let resolver = IdentityResolver::new("s3cret", None, directory());
        assert!(resolver.identify(&HeaderMap::new()).is_none());

        let other = IdentityResolver::new("other", None, directory());
        let cookies = other.remember("editor").unwrap();
        assert!(resolver.identify(&request_with(&cookies[0])).is_none());
    }

    #[test]
    fn ticket_for_unknown_user_is_anonymous() {
        let resolver = IdentityResolver::new("s3cret", None, directory());
        let cookies = resolver.remember("ghost").unwrap();
        assert!(resolver.identify(&request_with(&cookies[0])).is_none());
    }

    #[test]
    fn forget_clears_cookie() {
        let resolver = IdentityResolver::new("s3cret", None, directory());
        let cleared = resolver.forget();
        assert!(cleared[0].to_str().unwrap().starts_with("auth_tkt=;"));
    }
}
