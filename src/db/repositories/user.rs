use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, sea_query::Expr,
};

use crate::entities::users;
use crate::models::user::User;
use crate::services::account_service::CredentialError;

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            user_id: Some(model.user_id),
            is_admin: model.is_admin,
            signup_time: model.signup_time,
            signup_ip: model.signup_ip,
            username: model.username,
            password_hash: model.password_hash,
            api_key: model.api_key,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new user; the store assigns `user_id`.
    pub async fn insert(&self, user: &User) -> Result<User, CredentialError> {
        let active = users::ActiveModel {
            user_id: NotSet,
            is_admin: Set(user.is_admin),
            signup_time: Set(user.signup_time),
            signup_ip: Set(user.signup_ip.clone()),
            username: Set(user.username.clone()),
            password_hash: Set(user.password_hash.clone()),
            api_key: Set(user.api_key.clone()),
        };

        let model = active.insert(&self.conn).await.map_err(map_write_error)?;
        Ok(User::from(model))
    }

    /// Replace only the password hash of a stored user.
    pub async fn update_password_hash(
        &self,
        user_id: i32,
        password_hash: &str,
    ) -> Result<(), CredentialError> {
        self.update_column(user_id, users::Column::PasswordHash, password_hash)
            .await
    }

    /// Replace only the API key of a stored user.
    pub async fn update_api_key(&self, user_id: i32, api_key: &str) -> Result<(), CredentialError> {
        self.update_column(user_id, users::Column::ApiKey, api_key)
            .await
    }

    // Single-column write so concurrent updates of the other secret survive
    async fn update_column(
        &self,
        user_id: i32,
        column: users::Column,
        value: &str,
    ) -> Result<(), CredentialError> {
        let result = users::Entity::update_many()
            .col_expr(column, Expr::value(value))
            .filter(users::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected == 0 {
            return Err(CredentialError::UserNotFound);
        }

        Ok(())
    }

    pub async fn get_by_id(&self, user_id: i32) -> Result<Option<User>, CredentialError> {
        let user = users::Entity::find_by_id(user_id).one(&self.conn).await?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, CredentialError> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_api_key(&self, api_key: &str) -> Result<Option<User>, CredentialError> {
        let user = users::Entity::find()
            .filter(users::Column::ApiKey.eq(api_key))
            .one(&self.conn)
            .await?;

        Ok(user.map(User::from))
    }

    pub async fn list(&self) -> Result<Vec<User>, CredentialError> {
        let rows = users::Entity::find()
            .order_by_asc(users::Column::UserId)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn delete(&self, user_id: i32) -> Result<bool, CredentialError> {
        let result = users::Entity::delete_by_id(user_id)
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

fn map_write_error(err: DbErr) -> CredentialError {
    match err.sql_err() {
        // SQLite reports "UNIQUE constraint failed: users.<column>"
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            let field = if message.contains("api_key") {
                "api_key"
            } else {
                "username"
            };
            CredentialError::UniquenessViolation { field }
        }
        _ => CredentialError::from(err),
    }
}
