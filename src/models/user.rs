use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{SecureHasher, generate_api_key};
use crate::services::account_service::CredentialError;

/// Matches the width of the `username` column.
pub const MAX_USERNAME_LEN: usize = 64;

/// A registered user account.
///
/// Always holds exactly one password hash and one API key. The plaintext
/// password is never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub(crate) user_id: Option<i32>,
    pub(crate) is_admin: bool,
    pub(crate) signup_time: i64,
    pub(crate) signup_ip: String,
    pub(crate) username: String,
    pub(crate) password_hash: String,
    pub(crate) api_key: String,
}

/// The fields of a [`User`] that may leave the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub user_id: Option<i32>,
    pub is_admin: bool,
    pub signup_time: i64,
    pub signup_ip: String,
    pub username: String,
    pub api_key: String,
}

impl User {
    /// Build a new, not yet persisted account.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Validation`] for an empty or over-long username.
    pub fn create(
        username: &str,
        password: &str,
        signup_ip: &str,
        is_admin: bool,
        hasher: &SecureHasher,
    ) -> Result<Self, CredentialError> {
        Self::create_with_key_generator(
            username,
            password,
            signup_ip,
            is_admin,
            hasher,
            &generate_api_key,
        )
    }

    /// Like [`User::create`], drawing the API key from `key_generator`.
    pub fn create_with_key_generator(
        username: &str,
        password: &str,
        signup_ip: &str,
        is_admin: bool,
        hasher: &SecureHasher,
        key_generator: &dyn Fn() -> String,
    ) -> Result<Self, CredentialError> {
        validate_username(username)?;

        Ok(Self {
            user_id: None,
            is_admin,
            signup_time: chrono::Utc::now().timestamp(),
            signup_ip: signup_ip.to_string(),
            username: username.to_string(),
            password_hash: hasher.secure_hash(password)?,
            api_key: key_generator(),
        })
    }

    #[must_use]
    pub fn validate_password(&self, password: &str, hasher: &SecureHasher) -> bool {
        hasher.verify(password, &self.password_hash)
    }

    pub fn update_password(
        &mut self,
        new_password: &str,
        hasher: &SecureHasher,
    ) -> Result<(), CredentialError> {
        self.password_hash = hasher.secure_hash(new_password)?;
        Ok(())
    }

    pub fn generate_new_api_key(&mut self) {
        self.generate_new_api_key_with(&generate_api_key);
    }

    pub fn generate_new_api_key_with(&mut self, key_generator: &dyn Fn() -> String) {
        self.api_key = key_generator();
    }

    #[must_use]
    pub fn as_public(&self) -> PublicUser {
        PublicUser {
            user_id: self.user_id,
            is_admin: self.is_admin,
            signup_time: self.signup_time,
            signup_ip: self.signup_ip.clone(),
            username: self.username.clone(),
            api_key: self.api_key.clone(),
        }
    }

    // Session-layer predicates: a loaded User is always a live principal.

    #[must_use]
    pub const fn is_authenticated() -> bool {
        true
    }

    #[must_use]
    pub const fn is_anonymous() -> bool {
        false
    }

    #[must_use]
    pub const fn is_active() -> bool {
        true
    }

    /// Session identifier, available once the store has assigned an id.
    #[must_use]
    pub fn get_id(&self) -> Option<String> {
        self.user_id.map(|id| id.to_string())
    }

    #[must_use]
    pub const fn user_id(&self) -> Option<i32> {
        self.user_id
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }

    #[must_use]
    pub const fn signup_time(&self) -> i64 {
        self.signup_time
    }

    #[must_use]
    pub fn signup_ip(&self) -> &str {
        &self.signup_ip
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("user_id", &self.user_id)
            .field("is_admin", &self.is_admin)
            .field("signup_time", &self.signup_time)
            .field("signup_ip", &self.signup_ip)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

fn validate_username(username: &str) -> Result<(), CredentialError> {
    if username.trim().is_empty() {
        return Err(CredentialError::Validation(
            "Username is required".to_string(),
        ));
    }

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(CredentialError::Validation(format!(
            "Username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;

    fn hasher() -> SecureHasher {
        SecureHasher::from_config(&SecurityConfig {
            argon2_memory_cost_kib: 64,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            ..SecurityConfig::default()
        })
        .unwrap()
    }

    fn is_alphanumeric(s: &str) -> bool {
        !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
    }

    #[test]
    fn test_create_example_user() {
        let before = chrono::Utc::now().timestamp();
        let user = User::create("alice", "hunter2", "10.0.0.1", false, &hasher()).unwrap();
        let after = chrono::Utc::now().timestamp();

        assert_eq!(user.username(), "alice");
        assert_eq!(user.signup_ip(), "10.0.0.1");
        assert!(!user.is_admin());
        assert!(user.signup_time() >= before && user.signup_time() <= after);
        assert!(is_alphanumeric(user.api_key()));
        assert_ne!(user.password_hash(), "hunter2");
        assert_eq!(user.user_id(), None);
        assert_eq!(user.get_id(), None);
    }

    #[test]
    fn test_create_rejects_bad_usernames() {
        let h = hasher();
        assert!(matches!(
            User::create("", "pw", "::1", false, &h),
            Err(CredentialError::Validation(_))
        ));
        assert!(matches!(
            User::create("   ", "pw", "::1", false, &h),
            Err(CredentialError::Validation(_))
        ));

        let long = "x".repeat(MAX_USERNAME_LEN + 1);
        assert!(matches!(
            User::create(&long, "pw", "::1", false, &h),
            Err(CredentialError::Validation(_))
        ));

        let max = "x".repeat(MAX_USERNAME_LEN);
        assert!(User::create(&max, "pw", "::1", false, &h).is_ok());
    }

    #[test]
    fn test_validate_password() {
        let h = hasher();
        let user = User::create("bob", "correct horse", "127.0.0.1", true, &h).unwrap();

        assert!(user.is_admin());
        assert!(user.validate_password("correct horse", &h));
        assert!(!user.validate_password("correct horse ", &h));
        assert!(!user.validate_password("", &h));
    }

    #[test]
    fn test_update_password_keeps_key_and_signup_time() {
        let h = hasher();
        let mut user = User::create("carol", "old-password", "127.0.0.1", false, &h).unwrap();
        let api_key = user.api_key().to_string();
        let signup_time = user.signup_time();

        user.update_password("new-password", &h).unwrap();

        assert!(user.validate_password("new-password", &h));
        assert!(!user.validate_password("old-password", &h));
        assert_eq!(user.api_key(), api_key);
        assert_eq!(user.signup_time(), signup_time);
    }

    #[test]
    fn test_generate_new_api_key() {
        let h = hasher();
        let mut user = User::create("dave", "pw", "127.0.0.1", false, &h).unwrap();
        let password_hash = user.password_hash().to_string();

        user.generate_new_api_key();
        let first = user.api_key().to_string();
        user.generate_new_api_key();
        let second = user.api_key().to_string();

        assert_ne!(first, second);
        assert!(is_alphanumeric(&first));
        assert!(is_alphanumeric(&second));
        assert_eq!(user.password_hash(), password_hash);
    }

    #[test]
    fn test_keys_come_from_the_given_generator() {
        let h = hasher();
        let mut user =
            User::create_with_key_generator("dora", "pw", "::1", false, &h, &|| "First1".to_string())
                .unwrap();
        assert_eq!(user.api_key(), "First1");

        user.generate_new_api_key_with(&|| "Second2".to_string());
        assert_eq!(user.api_key(), "Second2");
    }

    #[test]
    fn test_public_representation_omits_password_hash() {
        let mut user = User::create("erin", "pw", "192.168.1.5", false, &hasher()).unwrap();
        user.user_id = Some(7);

        let json = serde_json::to_value(user.as_public()).unwrap();
        let obj = json.as_object().unwrap();

        assert!(!obj.contains_key("password_hash"));
        assert_eq!(obj.len(), 6);
        assert_eq!(json["user_id"], 7);
        assert_eq!(json["is_admin"], false);
        assert_eq!(json["username"], "erin");
        assert_eq!(json["signup_ip"], "192.168.1.5");
        assert_eq!(json["api_key"], user.api_key());
        assert_eq!(json["signup_time"], user.signup_time());
        assert!(!json.to_string().contains(user.password_hash()));
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let user = User::create("frank", "pw", "127.0.0.1", false, &hasher()).unwrap();
        let debug = format!("{user:?}");

        assert!(debug.contains("frank"));
        assert!(!debug.contains(user.password_hash()));
        assert!(!debug.contains(user.api_key()));
    }

    #[test]
    fn test_session_predicates_and_id() {
        assert!(User::is_authenticated());
        assert!(!User::is_anonymous());
        assert!(User::is_active());

        let mut user = User::create("grace", "pw", "127.0.0.1", false, &hasher()).unwrap();
        user.user_id = Some(42);
        assert_eq!(user.get_id().as_deref(), Some("42"));
    }
}
