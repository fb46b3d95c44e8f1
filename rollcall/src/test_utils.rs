//! Shared helpers for the test suite.

use std::sync::Arc;

use crate::{
    AppState,
    api::models::users::Role,
    auth::{
        password::{Argon2Params, hash_password_with_params},
        resolver::{AuthenticatedIdentity, CredentialResolver},
        session::SessionKeys,
    },
    config::Config,
    store::{Account, CredentialStore, MemoryCredentialStore},
    types::AccountId,
};

/// Configuration with a signing key and cheap argon2 work factors.
pub fn create_test_config() -> Config {
    let mut config = Config {
        secret_key: Some("test-secret-key-for-sessions".to_string()),
        ..Default::default()
    };
    config.auth.password.argon2_memory_kib = 64;
    config.auth.password.argon2_iterations = 1;
    config.auth.session.cookie_secure = false;
    config
}

/// Hash with the cheap test work factors.
pub fn test_hash(secret: &str) -> String {
    let params = Argon2Params {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    };
    hash_password_with_params(secret, params).expect("test hash")
}

pub fn create_test_identity(role: Role) -> AuthenticatedIdentity {
    AuthenticatedIdentity {
        id: AccountId::new_v4(),
        role,
        display_name: Some("Test Account".to_string()),
    }
}

/// App state over a fresh in-memory store.
pub fn create_test_app_state() -> AppState {
    let config = create_test_config();
    let store = Arc::new(MemoryCredentialStore::new());
    let session_keys = Arc::new(SessionKeys::from_config(&config).expect("test session keys"));
    let resolver = CredentialResolver::new(store.clone() as Arc<dyn CredentialStore>, &config.auth);

    AppState::builder()
        .config(config)
        .store(store)
        .resolver(resolver)
        .session_keys(session_keys)
        .build()
}

/// Seed an administrative account reachable by email.
pub fn seed_admin(state: &AppState, email: &str, secret: &str, role: Role) -> AccountId {
    let id = AccountId::new_v4();
    state
        .store
        .insert(Account {
            id,
            email: Some(email.to_string()),
            student_id: None,
            display_name: Some("Seeded Admin".to_string()),
            password_hash: Some(test_hash(secret)),
            role,
        })
        .expect("seed admin account");
    id
}

/// Seed a student account reachable by student id. The record also carries
/// an email so tier-isolation tests can try to resolve it the wrong way.
pub fn seed_student(state: &AppState, student_id: &str, secret: &str) -> AccountId {
    let id = AccountId::new_v4();
    state
        .store
        .insert(Account {
            id,
            email: Some(format!("{student_id}@students.example")),
            student_id: Some(student_id.to_string()),
            display_name: Some("Seeded Student".to_string()),
            password_hash: Some(test_hash(secret)),
            role: Role::Student,
        })
        .expect("seed student account");
    id
}

/// Seed an account with no usable credential.
pub fn seed_account_without_password(state: &AppState, email: &str, role: Role) -> AccountId {
    let id = AccountId::new_v4();
    state
        .store
        .insert(Account {
            id,
            email: Some(email.to_string()),
            student_id: None,
            display_name: None,
            password_hash: None,
            role,
        })
        .expect("seed locked account");
    id
}
