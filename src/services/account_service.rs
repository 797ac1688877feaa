//! Domain service for account credentials.
//!
//! Handles signup, password login, API key authentication, password changes,
//! and API key rotation.

use thiserror::Error;

use crate::models::user::{PublicUser, User};

/// Errors specific to credential operations.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("{field} is already taken")]
    UniquenessViolation { field: &'static str },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CredentialError {
    #[must_use]
    pub const fn is_uniqueness_violation(&self) -> bool {
        matches!(self, Self::UniquenessViolation { .. })
    }
}

impl From<sea_orm::DbErr> for CredentialError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CredentialError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<tokio::task::JoinError> for CredentialError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Hashing task panicked: {err}"))
    }
}

/// Domain service trait for account credentials.
#[async_trait::async_trait]
pub trait CredentialService: Send + Sync {
    /// Creates and stores a new account.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::UniquenessViolation`] if the username is taken.
    async fn signup(
        &self,
        username: &str,
        password: &str,
        signup_ip: &str,
        is_admin: bool,
    ) -> Result<User, CredentialError>;

    /// Verifies a username/password pair.
    ///
    /// Unknown users and wrong passwords both yield `Ok(None)`.
    async fn login(&self, username: &str, password: &str) -> Result<Option<User>, CredentialError>;

    /// Resolves an API key to its owner.
    async fn authenticate_api_key(&self, api_key: &str) -> Result<Option<User>, CredentialError>;

    async fn get_user(&self, user_id: i32) -> Result<User, CredentialError>;

    async fn list_users(&self) -> Result<Vec<PublicUser>, CredentialError>;

    /// Replaces a user's password. The API key is left as is.
    async fn change_password(&self, user_id: i32, new_password: &str)
    -> Result<(), CredentialError>;

    /// Issues a fresh API key for a user and returns it.
    async fn regenerate_api_key(&self, user_id: i32) -> Result<String, CredentialError>;

    async fn delete_user(&self, user_id: i32) -> Result<(), CredentialError>;
}
