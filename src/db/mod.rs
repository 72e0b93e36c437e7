use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::admin::Admin;
pub use repositories::ballot::BallotOutcome;
pub use repositories::contestant::Contestant;
pub use repositories::user::{NewUser, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1, Duration::from_secs(10)).await
    }

    pub async fn from_config(config: &crate::config::DatabaseConfig) -> Result<Self> {
        Self::with_pool_options(
            &config.url,
            config.max_connections,
            config.min_connections,
            Duration::from_secs(config.acquire_timeout_seconds),
        )
        .await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if let Some(path_str) = db_url.strip_prefix("sqlite:")
            && !path_str.contains(":memory:")
        {
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(acquire_timeout)
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

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

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn contestant_repo(&self) -> repositories::contestant::ContestantRepository {
        repositories::contestant::ContestantRepository::new(self.conn.clone())
    }

    fn admin_repo(&self) -> repositories::admin::AdminRepository {
        repositories::admin::AdminRepository::new(self.conn.clone())
    }

    fn ballot_repo(&self) -> repositories::ballot::BallotRepository {
        repositories::ballot::BallotRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(&self, new_user: NewUser) -> Result<Option<User>> {
        self.user_repo().create(new_user).await
    }

    pub async fn user_exists(&self, username: &str, email: &str) -> Result<bool> {
        self.user_repo()
            .exists_with_username_or_email(username, email)
            .await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_credentials(&self, email: &str) -> Result<Option<(User, String)>> {
        self.user_repo().get_credentials_by_email(email).await
    }

    pub async fn find_user_by_pending_code(&self, code: &str) -> Result<Option<User>> {
        self.user_repo().find_by_pending_code(code).await
    }

    pub async fn find_user_by_consumed_code(&self, code: &str) -> Result<Option<User>> {
        self.user_repo().find_by_consumed_code(code).await
    }

    pub async fn mark_user_verified(&self, user_id: i32, code: &str) -> Result<bool> {
        self.user_repo().mark_verified(user_id, code).await
    }

    pub async fn toggle_user_blocked(&self, user_id: i32) -> Result<Option<bool>> {
        self.user_repo().toggle_blocked(user_id).await
    }

    pub async fn list_users_newest_first(&self) -> Result<Vec<User>> {
        self.user_repo().list_newest_first().await
    }

    // ========== Contestants ==========

    pub async fn add_contestant(&self, name: &str, description: &str) -> Result<Contestant> {
        self.contestant_repo().add(name, description).await
    }

    pub async fn get_contestant(&self, id: i32) -> Result<Option<Contestant>> {
        self.contestant_repo().get(id).await
    }

    pub async fn list_contestants(&self) -> Result<Vec<Contestant>> {
        self.contestant_repo().list_all().await
    }

    pub async fn list_contestants_newest_first(&self) -> Result<Vec<Contestant>> {
        self.contestant_repo().list_newest_first().await
    }

    pub async fn remove_contestant(&self, id: i32) -> Result<bool> {
        self.contestant_repo().remove(id).await
    }

    // ========== Ballot ==========

    pub async fn cast_ballot(&self, user_id: i32, contestant_id: i32) -> Result<BallotOutcome> {
        self.ballot_repo().cast(user_id, contestant_id).await
    }

    // ========== Admins ==========

    pub async fn admin_count(&self) -> Result<u64> {
        self.admin_repo().count().await
    }

    pub async fn get_admin_credentials(&self, username: &str) -> Result<Option<(Admin, String)>> {
        self.admin_repo().get_credentials(username).await
    }

    pub async fn create_admin(&self, username: &str, password_hash: &str) -> Result<Option<Admin>> {
        self.admin_repo().create(username, password_hash).await
    }
}
