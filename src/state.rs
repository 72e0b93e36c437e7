use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AdminService, IdentityService, Mailer, SeaOrmAdminService, SeaOrmIdentityService,
    SeaOrmVotingService, VotingService, build_mailer,
};

/// Long-lived services shared by every request.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub identity_service: Arc<dyn IdentityService>,

    pub voting_service: Arc<dyn VotingService>,

    pub admin_service: Arc<dyn AdminService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mailer = build_mailer(&config.mail)?;
        Self::with_mailer(config, mailer).await
    }

    /// Builds the state around a caller-provided mailer.
    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let store = Store::from_config(&config.database).await?;
        Ok(Self::from_parts(config, store, mailer))
    }

    #[must_use]
    pub fn from_parts(config: Config, store: Store, mailer: Arc<dyn Mailer>) -> Self {
        let config = Arc::new(config);

        let identity_service = Arc::new(SeaOrmIdentityService::new(
            store.clone(),
            mailer,
            config.clone(),
        )) as Arc<dyn IdentityService>;

        let voting_service =
            Arc::new(SeaOrmVotingService::new(store.clone())) as Arc<dyn VotingService>;

        let admin_service = Arc::new(SeaOrmAdminService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AdminService>;

        Self {
            config,
            store,
            identity_service,
            voting_service,
            admin_service,
        }
    }
}
