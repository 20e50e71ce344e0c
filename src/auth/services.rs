use std::sync::Arc;

use lazy_static::lazy_static;
use tracing::{debug, error};
use uuid::Uuid;

use crate::auth::{
    password::{hash_password, verify_password},
    repo::UserStore,
    repo_types::{NewUser, StoreError, User},
};

lazy_static! {
    // Hashed with the same parameters as stored passwords.
    static ref DUMMY_HASH: Option<String> = hash_password("authkit-unknown-account").ok();
}

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Hash(#[from] anyhow::Error),
}

/// Credential store adapter: every read and write of user records, and the
/// only place that touches password hashes.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn UserStore>,
}

impl Credentials {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.store.find_by_email(&normalize_email(email)).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.store.find_by_id(id).await
    }

    /// Hashes the password and inserts the user. Fails with
    /// `StoreError::DuplicateEmail` when the normalized email is taken.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        plain_password: &str,
    ) -> Result<User, CreateUserError> {
        let password_hash = hash_password(plain_password)?;
        let user = self
            .store
            .insert(NewUser {
                name: name.trim().to_string(),
                email: normalize_email(email),
                password_hash,
            })
            .await?;
        debug!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub fn verify_password(&self, user: &User, plain_password: &str) -> bool {
        match verify_password(plain_password, &user.password_hash) {
            Ok(ok) => ok,
            Err(e) => {
                error!(error = %e, user_id = %user.id, "stored password hash unusable");
                false
            }
        }
    }

    /// Runs one hash verification and discards the result, so a login for an
    /// unknown email costs as much as a wrong password.
    pub fn verify_against_dummy(&self, plain_password: &str) {
        match DUMMY_HASH.as_deref() {
            Some(hash) => {
                let _ = verify_password(plain_password, hash);
            }
            None => error!("dummy password hash unavailable"),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
