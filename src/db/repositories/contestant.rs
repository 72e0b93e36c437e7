use crate::entities::{contestants, prelude::*};
use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Serialize;
use tracing::info;

/// Repository for contestant operations
pub struct ContestantRepository {
    conn: DatabaseConnection,
}

impl ContestantRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, name: &str, description: &str) -> Result<Contestant> {
        let active = contestants::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            votes: Set(0),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert contestant")?;

        info!("Added contestant {} ({})", model.name, model.id);
        Ok(Contestant::from(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Contestant>> {
        let row = Contestants::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(Contestant::from))
    }

    pub async fn list_all(&self) -> Result<Vec<Contestant>> {
        let rows = Contestants::find()
            .order_by_asc(contestants::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Contestant::from).collect())
    }

    pub async fn list_newest_first(&self) -> Result<Vec<Contestant>> {
        let rows = Contestants::find()
            .order_by_desc(contestants::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Contestant::from).collect())
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Contestants::delete_by_id(id).exec(&self.conn).await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed contestant with ID: {}", id);
        }
        Ok(removed)
    }
}

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contestant {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub votes: i32,
    pub created_at: String,
}

impl From<contestants::Model> for Contestant {
    fn from(model: contestants::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            votes: model.votes,
            created_at: model.created_at,
        }
    }
}
