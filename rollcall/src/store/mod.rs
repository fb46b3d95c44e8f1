//! Credential store interface.
//!
//! The store is an external collaborator: it maps an email address or an
//! institution-issued student identifier to at most one [`Account`]. The
//! resolver consumes it through the narrow [`CredentialStore`] trait and
//! never mutates it. [`memory::MemoryCredentialStore`] is the bundled
//! reference implementation, used by the binary and as the test double.

use async_trait::async_trait;
use thiserror::Error as ThisError;

use crate::api::models::users::Role;
use crate::types::AccountId;

pub mod memory;

pub use memory::MemoryCredentialStore;

/// An identity record held by the credential store.
///
/// Each account is reachable through exactly one identifier namespace:
/// administrative roles carry an `email`, the student role a `student_id`.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: Option<String>,
    pub student_id: Option<String>,
    pub display_name: Option<String>,
    /// Argon2 PHC string. Absent means the account has no usable password
    /// and every login against it fails closed.
    pub password_hash: Option<String>,
    pub role: Role,
}

#[derive(Debug, ThisError)]
pub enum StoreError {
    /// The store could not be reached or did not answer in time
    #[error("credential store unavailable: {reason}")]
    Unavailable { reason: String },

    /// An identifier is already taken in its namespace
    #[error("identifier already in use: {identifier}")]
    Conflict { identifier: String },
}

/// Lookup interface over the credential store.
///
/// Each method is restricted to one identifier namespace and the role tier
/// that namespace belongs to; implementations must never return a match
/// from the other tier.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up an account by email, restricted to the given roles.
    async fn find_by_email(&self, email: &str, roles: &[Role]) -> Result<Option<Account>, StoreError>;

    /// Look up a student-role account by its student identifier.
    async fn find_by_student_id(&self, student_id: &str) -> Result<Option<Account>, StoreError>;
}
