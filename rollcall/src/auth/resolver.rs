//! Credential resolution.
//!
//! Turns a login request into an authenticated identity or a typed failure.
//! The resolver is read-only against the credential store: an unknown
//! identifier is `NotFound`, never an implicitly created account. Lookups
//! are restricted to the role tier matching the identifier namespace, so an
//! email can only ever resolve an administrative account and a student id
//! only a student account.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use tracing::{instrument, warn};

use crate::api::models::users::Role;
use crate::auth::password;
use crate::config::AuthConfig;
use crate::store::CredentialStore;
use crate::types::{AccountId, abbrev_uuid};

/// Which namespace a login credential is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentifierKind {
    Email,
    StudentId,
}

/// A login attempt. Ephemeral, never persisted or logged with its secret.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identifier_kind: IdentifierKind,
    pub identifier: String,
    pub secret: String,
}

/// The outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub id: AccountId,
    pub role: Role,
    pub display_name: Option<String>,
}

/// Typed resolution failures.
///
/// `NotFound`, `InvalidSecret` and `NoCredentialSet` are collapsed into one
/// generic message at the HTTP surface; the distinct kind is only logged.
#[derive(Debug, ThisError)]
pub enum AuthFailure {
    #[error("malformed login request: {reason}")]
    MalformedRequest { reason: &'static str },

    #[error("no account matches the supplied identifier")]
    NotFound,

    #[error("secret does not match the stored credential")]
    InvalidSecret,

    #[error("account has no usable credential")]
    NoCredentialSet,

    #[error("credential store unavailable: {reason}")]
    StoreUnavailable { reason: String },
}

/// Resolves login requests against the credential store.
///
/// Cheap to clone; holds the store handle and the configured bounds on the
/// two suspend points (store lookup, password verification).
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn CredentialStore>,
    store_timeout: Duration,
    verify_timeout: Duration,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn CredentialStore>, auth: &AuthConfig) -> Self {
        Self {
            store,
            store_timeout: auth.store_timeout,
            verify_timeout: auth.verify_timeout,
        }
    }

    /// Resolve a login request to an authenticated identity.
    ///
    /// The password verification runs on a blocking thread so concurrent
    /// logins never serialize behind one argon2 computation.
    #[instrument(skip_all, fields(kind = ?request.identifier_kind))]
    pub async fn resolve(&self, request: &LoginRequest) -> Result<AuthenticatedIdentity, AuthFailure> {
        let identifier = request.identifier.trim();
        if identifier.is_empty() {
            return Err(AuthFailure::MalformedRequest {
                reason: "identifier must not be empty",
            });
        }
        if request.secret.is_empty() {
            return Err(AuthFailure::MalformedRequest {
                reason: "secret must not be empty",
            });
        }

        let lookup = match request.identifier_kind {
            IdentifierKind::Email => self.store.find_by_email(identifier, &[Role::Admin, Role::SuperAdmin]),
            IdentifierKind::StudentId => self.store.find_by_student_id(identifier),
        };
        let account = match tokio::time::timeout(self.store_timeout, lookup).await {
            Ok(Ok(account)) => account,
            Ok(Err(store_error)) => {
                return Err(AuthFailure::StoreUnavailable {
                    reason: store_error.to_string(),
                });
            }
            Err(_) => {
                return Err(AuthFailure::StoreUnavailable {
                    reason: "lookup timed out".to_string(),
                });
            }
        };

        let Some(account) = account else {
            return Err(AuthFailure::NotFound);
        };

        // Cross-tier matches are treated as not found, whatever the store returned
        let tier_matches = match request.identifier_kind {
            IdentifierKind::Email => account.role.is_administrative(),
            IdentifierKind::StudentId => account.role == Role::Student,
        };
        if !tier_matches {
            return Err(AuthFailure::NotFound);
        }

        // An account without a hash never authenticates; there is no
        // comparison against an empty or default hash
        let Some(hash) = account.password_hash.clone() else {
            return Err(AuthFailure::NoCredentialSet);
        };

        let secret = request.secret.clone();
        let verification = tokio::task::spawn_blocking(move || password::verify_password(&secret, &hash));
        let matched = match tokio::time::timeout(self.verify_timeout, verification).await {
            Ok(Ok(Ok(matched))) => matched,
            Ok(Ok(Err(error))) => {
                // Undecodable stored hash: fail closed as an unusable credential
                warn!(account = %abbrev_uuid(&account.id), %error, "stored credential could not be parsed");
                return Err(AuthFailure::NoCredentialSet);
            }
            Ok(Err(join_error)) => {
                return Err(AuthFailure::StoreUnavailable {
                    reason: format!("verification task failed: {join_error}"),
                });
            }
            Err(_) => {
                return Err(AuthFailure::StoreUnavailable {
                    reason: "verification timed out".to_string(),
                });
            }
        };

        if !matched {
            return Err(AuthFailure::InvalidSecret);
        }

        Ok(AuthenticatedIdentity {
            id: account.id,
            role: account.role,
            display_name: account.display_name,
        })
    }
}
