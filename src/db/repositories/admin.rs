use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr,
};

use crate::entities::{admins, prelude::*};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub id: i32,
    pub username: String,
}

impl From<admins::Model> for Admin {
    fn from(model: admins::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
        }
    }
}

pub struct AdminRepository {
    conn: DatabaseConnection,
}

impl AdminRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn count(&self) -> Result<u64> {
        Admins::find()
            .count(&self.conn)
            .await
            .context("Failed to count admins")
    }

    pub async fn get_credentials(&self, username: &str) -> Result<Option<(Admin, String)>> {
        let admin = Admins::find()
            .filter(admins::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query admin by username")?;

        Ok(admin.map(|a| {
            let password_hash = a.password_hash.clone();
            (Admin::from(a), password_hash)
        }))
    }

    /// Returns `None` if an admin with that username already exists.
    pub async fn create(&self, username: &str, password_hash: &str) -> Result<Option<Admin>> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = admins::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(Some(Admin::from(model))),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(None)
            }
            Err(e) => Err(e).context("Failed to insert admin"),
        }
    }
}
