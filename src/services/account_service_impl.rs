//! `SeaORM` implementation of the `CredentialService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task;
use tracing::{debug, info, warn};

use crate::config::SecurityConfig;
use crate::crypto::{SecureHasher, generate_api_key};
use crate::db::Store;
use crate::models::user::{PublicUser, User};
use crate::services::account_service::{CredentialError, CredentialService};

/// Source of fresh API keys. Defaults to [`generate_api_key`].
pub type ApiKeyGenerator = Arc<dyn Fn() -> String + Send + Sync>;

pub struct SeaOrmCredentialService {
    store: Store,
    hasher: SecureHasher,
    api_key_max_attempts: u32,
    key_generator: ApiKeyGenerator,
}

impl SeaOrmCredentialService {
    #[must_use]
    pub fn new(store: Store, hasher: SecureHasher, api_key_max_attempts: u32) -> Self {
        Self {
            store,
            hasher,
            api_key_max_attempts,
            key_generator: Arc::new(generate_api_key),
        }
    }

    /// Replace the API key source used by signup and rotation.
    #[must_use]
    pub fn with_key_generator(mut self, key_generator: ApiKeyGenerator) -> Self {
        self.key_generator = key_generator;
        self
    }

    pub fn from_config(store: Store, config: &SecurityConfig) -> anyhow::Result<Self> {
        let hasher = SecureHasher::from_config(config)?;
        Ok(Self::new(store, hasher, config.api_key_max_attempts))
    }

    async fn require_user(&self, user_id: i32) -> Result<User, CredentialError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(CredentialError::UserNotFound)
    }

    /// Whether another key should be drawn after `attempt` collisions.
    const fn retry_key(&self, attempt: u32) -> bool {
        attempt < self.api_key_max_attempts
    }
}

#[async_trait]
impl CredentialService for SeaOrmCredentialService {
    async fn signup(
        &self,
        username: &str,
        password: &str,
        signup_ip: &str,
        is_admin: bool,
    ) -> Result<User, CredentialError> {
        let hasher = self.hasher.clone();
        let key_generator = Arc::clone(&self.key_generator);
        let (username, password, signup_ip) = (
            username.to_string(),
            password.to_string(),
            signup_ip.to_string(),
        );

        // Argon2 is CPU-bound; keep it off the async workers
        let mut user = task::spawn_blocking(move || {
            User::create_with_key_generator(
                &username,
                &password,
                &signup_ip,
                is_admin,
                &hasher,
                &*key_generator,
            )
        })
        .await??;

        let mut attempt = 1;
        loop {
            match self.store.insert_user(&user).await {
                Ok(stored) => {
                    info!(
                        user_id = stored.user_id(),
                        username = stored.username(),
                        is_admin = stored.is_admin(),
                        "User created"
                    );
                    return Ok(stored);
                }
                Err(CredentialError::UniquenessViolation { field: "api_key" })
                    if self.retry_key(attempt) =>
                {
                    warn!(attempt, "API key collision on signup, drawing a new key");
                    user.generate_new_api_key_with(&*self.key_generator);
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_uniqueness_violation() {
                        warn!(username = user.username(), "Signup rejected: {err}");
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<Option<User>, CredentialError> {
        let user = self.store.get_user_by_username(username).await?;
        let hasher = self.hasher.clone();
        let password = password.to_string();

        let Some(user) = user else {
            debug!(username, "Login for unknown user");
            // Spend the same hashing cost as a real check
            task::spawn_blocking(move || hasher.secure_hash(&password)).await??;
            return Ok(None);
        };

        let (user, is_valid) = task::spawn_blocking(move || {
            let is_valid = user.validate_password(&password, &hasher);
            (user, is_valid)
        })
        .await?;

        if is_valid {
            debug!(user_id = user.user_id(), "Password login succeeded");
            Ok(Some(user))
        } else {
            debug!(user_id = user.user_id(), "Password login failed");
            Ok(None)
        }
    }

    async fn authenticate_api_key(&self, api_key: &str) -> Result<Option<User>, CredentialError> {
        if api_key.is_empty() {
            return Ok(None);
        }

        let user = self.store.get_user_by_api_key(api_key).await?;
        Ok(user)
    }

    async fn get_user(&self, user_id: i32) -> Result<User, CredentialError> {
        self.require_user(user_id).await
    }

    async fn list_users(&self) -> Result<Vec<PublicUser>, CredentialError> {
        let users = self.store.list_users().await?;
        Ok(users.iter().map(User::as_public).collect())
    }

    async fn change_password(
        &self,
        user_id: i32,
        new_password: &str,
    ) -> Result<(), CredentialError> {
        let user = self.require_user(user_id).await?;
        let hasher = self.hasher.clone();
        let new_password = new_password.to_string();

        let user = task::spawn_blocking(move || {
            let mut user = user;
            user.update_password(&new_password, &hasher)?;
            Ok::<User, CredentialError>(user)
        })
        .await??;

        self.store
            .update_user_password_hash(user_id, user.password_hash())
            .await?;

        info!(user_id, "Password changed");
        Ok(())
    }

    async fn regenerate_api_key(&self, user_id: i32) -> Result<String, CredentialError> {
        let mut attempt = 1;
        let api_key = loop {
            let api_key = (self.key_generator)();

            match self.store.update_user_api_key(user_id, &api_key).await {
                Ok(()) => break api_key,
                Err(CredentialError::UniquenessViolation { field: "api_key" })
                    if self.retry_key(attempt) =>
                {
                    warn!(attempt, user_id, "API key collision on rotation, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        };

        info!(user_id, "API key regenerated");
        Ok(api_key)
    }

    async fn delete_user(&self, user_id: i32) -> Result<(), CredentialError> {
        if !self.store.delete_user(user_id).await? {
            return Err(CredentialError::UserNotFound);
        }

        info!(user_id, "User deleted");
        Ok(())
    }
}
