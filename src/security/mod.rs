pub mod acl;
pub mod identity;
pub mod password;
pub mod policy;
pub mod signing;

pub use acl::{Ace, Acl, Action, Grant, Permission, Principal};
pub use identity::{AUTH_COOKIE, Identity, IdentityResolver, UserDirectory, UserRecord};
pub use password::{check_password, hash_password};
pub use policy::{RequestAuth, SecurityPolicy};
pub use signing::CookieSigner;
