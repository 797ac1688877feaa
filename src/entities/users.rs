use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i32,

    #[sea_orm(indexed)]
    pub is_admin: bool,

    /// Unix seconds
    pub signup_time: i64,

    pub signup_ip: String,

    #[sea_orm(unique, column_type = "String(StringLen::N(64))")]
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Random alphanumeric API key
    #[sea_orm(unique, column_type = "String(StringLen::N(64))")]
    pub api_key: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
