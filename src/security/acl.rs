//! Principals, permissions and ordered access control lists.

use std::fmt;

/// A tag standing for an identity, a group, or a special category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    /// Every request, logged in or not.
    Everyone,
    /// Any request carrying a valid identity.
    Authenticated,
    /// A single user, rendered as `u:<userid>`.
    User(String),
    /// A group tag such as `group:editors`, stored verbatim.
    Group(String),
}

impl Principal {
    pub fn user(userid: &str) -> Self {
        Principal::User(userid.to_string())
    }

    pub fn group(tag: &str) -> Self {
        Principal::Group(tag.to_string())
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Everyone => f.write_str("system.Everyone"),
            Principal::Authenticated => f.write_str("system.Authenticated"),
            Principal::User(id) => write!(f, "u:{}", id),
            Principal::Group(tag) => f.write_str(tag),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    View,
    Edit,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::View => f.write_str("view"),
            Permission::Edit => f.write_str("edit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Allow,
    Deny,
}

/// Which permissions an entry applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    All,
    Only(Vec<Permission>),
}

impl Grant {
    fn covers(&self, permission: Permission) -> bool {
        match self {
            Grant::All => true,
            Grant::Only(perms) => perms.contains(&permission),
        }
    }
}

/// One access control entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ace {
    pub action: Action,
    pub principal: Principal,
    pub grant: Grant,
}

impl Ace {
    pub fn allow(principal: Principal, permission: Permission) -> Self {
        Self { action: Action::Allow, principal, grant: Grant::Only(vec![permission]) }
    }

    pub fn deny(principal: Principal, permission: Permission) -> Self {
        Self { action: Action::Deny, principal, grant: Grant::Only(vec![permission]) }
    }

    pub fn deny_all(principal: Principal) -> Self {
        Self { action: Action::Deny, principal, grant: Grant::All }
    }
}

/// Ordered entries; the first entry matching both principal and permission decides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acl {
    entries: Vec<Ace>,
}

impl Acl {
    pub fn new(entries: Vec<Ace>) -> Self {
        Self { entries }
    }

    /// The ACL attached to every wiki route: anyone may view, editors may edit.
    pub fn wiki_root() -> Self {
        Self::new(vec![
            Ace::allow(Principal::Everyone, Permission::View),
            Ace::allow(Principal::group("group:editors"), Permission::Edit),
        ])
    }

    pub fn entries(&self) -> &[Ace] {
        &self.entries
    }

    /// Answer whether `principals` hold `permission`; no matching entry means deny.
    pub fn permits(&self, principals: &[Principal], permission: Permission) -> bool {
        for ace in &self.entries {
            if ace.grant.covers(permission) && principals.contains(&ace.principal) {
                return ace.action == Action::Allow;
            }
        }
        false
    }
}
