use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    /// Always stored lower-cased.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub is_verified: bool,

    /// Pending 32-char alphanumeric verification token, cleared once used.
    #[sea_orm(indexed)]
    pub verification_code: Option<String>,

    /// The token that completed verification.
    #[sea_orm(indexed)]
    pub verified_with: Option<String>,

    pub blocked: bool,

    /// Set exactly once by the ballot transaction.
    pub has_voted: bool,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
