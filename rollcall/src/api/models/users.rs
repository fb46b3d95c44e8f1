//! API models for accounts and roles.

use serde::{Deserialize, Serialize};

use crate::auth::resolver::AuthenticatedIdentity;
use crate::auth::session::SessionClaims;
use crate::types::AccountId;

/// Authorization tier carried in the session token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Admin and super admin resolve by email and share the admin area.
    pub fn is_administrative(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

/// The authenticated caller, as seen by handlers.
///
/// Built from verified session claims only; handlers never re-query the
/// credential store for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: AccountId,
    pub role: Role,
    pub display_name: Option<String>,
}

impl From<SessionClaims> for CurrentUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
            display_name: claims.name,
        }
    }
}

impl From<AuthenticatedIdentity> for CurrentUser {
    fn from(identity: AuthenticatedIdentity) -> Self {
        Self {
            id: identity.id,
            role: identity.role,
            display_name: identity.display_name,
        }
    }
}
