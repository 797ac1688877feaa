use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::user::User;
use crate::services::account_service::CredentialError;

pub mod migrator;
pub mod repositories;

pub use repositories::user::UserRepository;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url
            .trim_start_matches("sqlite:")
            .trim_start_matches("//")
            .split('?')
            .next()
            .unwrap_or_default();
        if !path_str.starts_with(":memory:") {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file: {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .context("Failed to connect to database")?;

        migrator::Migrator::up(&conn, None)
            .await
            .context("Failed to apply migrations")?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    // ========== User Repository Methods ==========

    #[must_use]
    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    pub async fn insert_user(&self, user: &User) -> Result<User, CredentialError> {
        self.user_repo().insert(user).await
    }

    pub async fn update_user_password_hash(
        &self,
        user_id: i32,
        password_hash: &str,
    ) -> Result<(), CredentialError> {
        self.user_repo()
            .update_password_hash(user_id, password_hash)
            .await
    }

    pub async fn update_user_api_key(
        &self,
        user_id: i32,
        api_key: &str,
    ) -> Result<(), CredentialError> {
        self.user_repo().update_api_key(user_id, api_key).await
    }

    pub async fn get_user(&self, user_id: i32) -> Result<Option<User>, CredentialError> {
        self.user_repo().get_by_id(user_id).await
    }

    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, CredentialError> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<User>, CredentialError> {
        self.user_repo().get_by_api_key(api_key).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, CredentialError> {
        self.user_repo().list().await
    }

    pub async fn delete_user(&self, user_id: i32) -> Result<bool, CredentialError> {
        self.user_repo().delete(user_id).await
    }
}
