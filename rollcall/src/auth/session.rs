//! Session token issuance and verification.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use crate::api::models::users::Role;
use crate::auth::resolver::AuthenticatedIdentity;
use crate::config::Config;
use crate::errors::Error;
use crate::types::AccountId;

/// Signing material and session lifetime, built once at startup from the
/// configured secret key and passed by reference into issuance and
/// verification. Deliberately does not implement `Debug`: key material
/// never reaches logs.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl SessionKeys {
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let secret_key = config.secret_key.as_ref().ok_or_else(|| Error::Internal {
            operation: "build session keys: secret_key is required".to_string(),
        })?;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret_key.as_bytes()),
            decoding: DecodingKey::from_secret(secret_key.as_bytes()),
            lifetime: config.auth.session.lifetime,
        })
    }
}

/// Session claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: AccountId,       // Subject (account ID)
    pub role: Role,           // Role at issuance time
    pub name: Option<String>, // Display name
    pub exp: i64,             // Expiration time
    pub iat: i64,             // Issued at
}

impl SessionClaims {
    /// Create new session claims for an authenticated identity
    pub fn new(identity: &AuthenticatedIdentity, lifetime: Duration) -> Self {
        let now = Utc::now();
        let exp = now + lifetime;

        Self {
            sub: identity.id,
            role: identity.role,
            name: identity.display_name.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Why an inbound token was rejected.
///
/// The gate treats every variant as "no valid session"; the distinction
/// exists for logging and tests, and is never surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum VerificationFailure {
    #[error("token signature does not verify")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
}

/// Create a signed session token for an authenticated identity.
///
/// The role claim is fixed at issuance: a role change on the account takes
/// effect on the next login, not on in-flight sessions.
pub fn issue(identity: &AuthenticatedIdentity, keys: &SessionKeys) -> Result<String, Error> {
    let claims = SessionClaims::new(identity, keys.lifetime);

    encode(&Header::default(), &claims, &keys.encoding).map_err(|e| Error::Internal {
        operation: format!("encode session token: {e}"),
    })
}

/// Verify and decode a session token.
///
/// Pure and non-blocking: the credential store is never consulted. Expiry
/// is checked without leeway, so `exp` in the past always fails.
pub fn verify(token: &str, keys: &SessionKeys) -> Result<SessionClaims, VerificationFailure> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<SessionClaims>(token, &keys.decoding, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => VerificationFailure::BadSignature,
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerificationFailure::Expired,
            // Everything else - bad base64, truncated segments, claims that
            // do not deserialize, wrong algorithm - is a parse failure
            _ => VerificationFailure::Malformed,
        })
}
