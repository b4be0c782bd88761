//! Effective principals and permission checks for a request.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::config::Config;
use crate::errors::WikiError;
use crate::security::acl::{Acl, Permission, Principal};
use crate::security::identity::{Identity, IdentityResolver, UserDirectory};

/// What the authorization layer learned about one request.
#[derive(Debug, Clone)]
pub struct RequestAuth {
    pub identity: Option<Identity>,
    pub principals: Vec<Principal>,
}

impl RequestAuth {
    pub fn anonymous() -> Self {
        Self { identity: None, principals: vec![Principal::Everyone] }
    }

    pub fn userid(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.userid.as_str())
    }
}

/// Combines the identity resolver, the user table and the resource ACL.
#[derive(Clone)]
pub struct SecurityPolicy {
    resolver: IdentityResolver,
    users: Arc<UserDirectory>,
    acl: Arc<Acl>,
}

impl SecurityPolicy {
    pub fn new(resolver: IdentityResolver, users: Arc<UserDirectory>, acl: Acl) -> Self {
        Self { resolver, users, acl: Arc::new(acl) }
    }

    /// Build the policy from configuration, hashing configured passwords
    pub fn from_config(config: &Config) -> Result<Self, WikiError> {
        let users = Arc::new(UserDirectory::from_config(&config.users)?);
        let resolver = IdentityResolver::new(&config.auth_secret, config.auth_timeout(), users.clone());
        Ok(Self::new(resolver, users, Acl::wiki_root()))
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub fn acl(&self) -> &Acl {
        &self.acl
    }

    /// Everyone, plus authenticated/user/group tags when an identity is present
    pub fn effective_principals(&self, identity: Option<&Identity>) -> Vec<Principal> {
        let mut principals = vec![Principal::Everyone];
        if let Some(identity) = identity {
            principals.push(Principal::Authenticated);
            principals.push(Principal::user(&identity.userid));
            principals.extend(self.users.groups(&identity.userid).iter().map(|g| Principal::group(g)));
        }
        principals
    }

    /// Resolve the identity and principals for a request
    pub fn authenticate(&self, headers: &HeaderMap) -> RequestAuth {
        let identity = self.resolver.identify(headers);
        let principals = self.effective_principals(identity.as_ref());
        RequestAuth { identity, principals }
    }

    /// Check `permission` against the given ACL
    pub fn permits(&self, acl: &Acl, principals: &[Principal], permission: Permission) -> bool {
        acl.permits(principals, permission)
    }

    /// Check `permission` against the root ACL
    pub fn permits_root(&self, auth: &RequestAuth, permission: Permission) -> bool {
        self.permits(&self.acl, &auth.principals, permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserConfig;

    fn policy() -> SecurityPolicy {
        let mut config = Config::new();
        config.users = vec![
            UserConfig { username: "editor".into(), password: Some("e".into()), password_hash: None, groups: vec!["group:editors".into()] },
            UserConfig { username: "viewer".into(), password: Some("v".into()), password_hash: None, groups: vec![] },
        ];
        SecurityPolicy::from_config(&config).unwrap()
    }

    #[test]
    fn anonymous_is_only_everyone() {
        assert_eq!(policy().effective_principals(None), vec![Principal::Everyone]);
    }

    #[test]
    fn editor_gets_group_tag() {
        let identity = Identity { userid: "editor".into() };
        assert_eq!(
            policy().effective_principals(Some(&identity)),
            vec![
                Principal::Everyone,
                Principal::Authenticated,
                Principal::user("editor"),
                Principal::group("group:editors"),
            ]
        );
    }

    #[test]
    fn root_permissions_follow_groups() {
        let policy = policy();
        let anon = RequestAuth::anonymous();
        assert!(policy.permits_root(&anon, Permission::View));
        assert!(!policy.permits_root(&anon, Permission::Edit));

        let viewer = Identity { userid: "viewer".into() };
        let auth = RequestAuth { principals: policy.effective_principals(Some(&viewer)), identity: Some(viewer) };
        assert!(policy.permits_root(&auth, Permission::View));
        assert!(!policy.permits_root(&auth, Permission::Edit));

        let editor = Identity { userid: "editor".into() };
        let auth = RequestAuth { principals: policy.effective_principals(Some(&editor)), identity: Some(editor) };
        assert!(policy.permits_root(&auth, Permission::Edit));
        assert_eq!(auth.userid(), Some("editor"));
    }

    #[test]
    fn request_without_cookie_is_anonymous() {
        let auth = policy().authenticate(&HeaderMap::new());
        assert!(auth.identity.is_none());
        assert_eq!(auth.principals, vec![Principal::Everyone]);
    }
}
