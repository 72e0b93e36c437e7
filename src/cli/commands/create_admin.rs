//! Create-admin command handler

use crate::config::Config;
use crate::db::Store;
use crate::services::{AdminError, AdminService, SeaOrmAdminService};

pub async fn cmd_create_admin(config: &Config, username: &str, password: &str) -> anyhow::Result<()> {
    let store = Store::from_config(&config.database).await?;
    let service = SeaOrmAdminService::new(store, config.security.clone());

    match service.create_admin(username, password).await {
        Ok(admin) => {
            println!("✓ Created admin '{}' (ID: {})", admin.username, admin.admin_id);
            Ok(())
        }
        Err(AdminError::Conflict(_)) => {
            println!("Admin '{}' already exists.", username.trim());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
