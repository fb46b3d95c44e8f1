//! In-memory credential store.

use std::sync::RwLock;

use async_trait::async_trait;

use super::{Account, CredentialStore, StoreError};
use crate::api::models::users::Role;

/// Credential store backed by process memory.
///
/// Writes happen during startup seeding and test setup; request handling
/// only ever reads. Uniqueness of the email and student-id namespaces is
/// enforced on insert, independently of each other.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    accounts: RwLock<Vec<Account>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account, rejecting duplicate identifiers within a namespace.
    pub fn insert(&self, account: Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().map_err(|_| StoreError::Unavailable {
            reason: "store lock poisoned".to_string(),
        })?;

        if let Some(email) = account.email.as_deref() {
            if accounts.iter().any(|existing| existing.email.as_deref() == Some(email)) {
                return Err(StoreError::Conflict {
                    identifier: email.to_string(),
                });
            }
        }
        if let Some(student_id) = account.student_id.as_deref() {
            if accounts.iter().any(|existing| existing.student_id.as_deref() == Some(student_id)) {
                return Err(StoreError::Conflict {
                    identifier: student_id.to_string(),
                });
            }
        }

        accounts.push(account);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str, roles: &[Role]) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().map_err(|_| StoreError::Unavailable {
            reason: "store lock poisoned".to_string(),
        })?;

        Ok(accounts
            .iter()
            .find(|account| account.email.as_deref() == Some(email) && roles.contains(&account.role))
            .cloned())
    }

    async fn find_by_student_id(&self, student_id: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().map_err(|_| StoreError::Unavailable {
            reason: "store lock poisoned".to_string(),
        })?;

        Ok(accounts
            .iter()
            .find(|account| account.student_id.as_deref() == Some(student_id) && account.role == Role::Student)
            .cloned())
    }
}
