mod error;
pub mod repos;
#[cfg(feature = "database-sqlite")]
pub mod sqlite;

#[cfg(all(test, feature = "database-sqlite"))]
pub mod tests;

use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use repos::*;

use crate::config::DatabaseConfig;

/// Cached repository trait objects, created once at startup.
struct CachedRepos {
    organizations: Arc<dyn OrganizationRepo>,
    users: Arc<dyn UserRepo>,
    groups: Arc<dyn GroupRepo>,
    permissions: Arc<dyn PermissionRepo>,
    permission_templates: Arc<dyn PermissionTemplateRepo>,
    settings: Arc<dyn SettingsRepo>,
}

#[cfg(feature = "database-sqlite")]
impl CachedRepos {
    fn sqlite(pool: &sqlx::SqlitePool) -> Self {
        Self {
            organizations: Arc::new(sqlite::SqliteOrganizationRepo::new(pool.clone())),
            users: Arc::new(sqlite::SqliteUserRepo::new(pool.clone())),
            groups: Arc::new(sqlite::SqliteGroupRepo::new(pool.clone())),
            permissions: Arc::new(sqlite::SqlitePermissionRepo::new(pool.clone())),
            permission_templates: Arc::new(sqlite::SqlitePermissionTemplateRepo::new(
                pool.clone(),
            )),
            settings: Arc::new(sqlite::SqliteSettingsRepo::new(pool.clone())),
        }
    }
}

enum PoolStorage {
    #[cfg(feature = "database-sqlite")]
    Sqlite(sqlx::SqlitePool),
    #[cfg(not(feature = "database-sqlite"))]
    _None(std::convert::Infallible),
}

/// Database pool.
///
/// Repositories are cached at construction time to avoid allocation on each access.
pub struct DbPool {
    inner: PoolStorage,
    repos: CachedRepos,
}

impl DbPool {
    /// Create a DbPool from an existing SQLite pool.
    /// Primarily useful for testing.
    #[cfg(feature = "database-sqlite")]
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        DbPool {
            repos: CachedRepos::sqlite(&pool),
            inner: PoolStorage::Sqlite(pool),
        }
    }

    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        match config {
            DatabaseConfig::None => Err(DbError::NotConfigured),
            #[cfg(feature = "database-sqlite")]
            DatabaseConfig::Sqlite(cfg) => {
                let pool = sqlx::sqlite::SqlitePoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .connect_with(
                        sqlx::sqlite::SqliteConnectOptions::new()
                            .filename(&cfg.path)
                            .create_if_missing(cfg.create_if_missing)
                            .foreign_keys(true)
                            .journal_mode(if cfg.wal_mode {
                                sqlx::sqlite::SqliteJournalMode::Wal
                            } else {
                                sqlx::sqlite::SqliteJournalMode::Delete
                            })
                            .busy_timeout(std::time::Duration::from_millis(cfg.busy_timeout_ms)),
                    )
                    .await?;
                tracing::info!(path = %cfg.path, "Connected to SQLite database");
                Ok(Self::from_sqlite(pool))
            }
        }
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        match &self.inner {
            #[cfg(feature = "database-sqlite")]
            PoolStorage::Sqlite(pool) => {
                tracing::info!("Running SQLite migrations");
                sqlx::migrate!("./migrations_sqlx/sqlite").run(pool).await?;
                tracing::info!("SQLite migrations completed successfully");
                Ok(())
            }
            #[cfg(not(feature = "database-sqlite"))]
            PoolStorage::_None(infallible) => match *infallible {},
        }
    }

    /// Get organization repository
    pub fn organizations(&self) -> Arc<dyn OrganizationRepo> {
        Arc::clone(&self.repos.organizations)
    }

    /// Get user repository
    pub fn users(&self) -> Arc<dyn UserRepo> {
        Arc::clone(&self.repos.users)
    }

    /// Get group repository
    pub fn groups(&self) -> Arc<dyn GroupRepo> {
        Arc::clone(&self.repos.groups)
    }

    /// Get permission grant repository
    pub fn permissions(&self) -> Arc<dyn PermissionRepo> {
        Arc::clone(&self.repos.permissions)
    }

    /// Get permission template repository
    pub fn permission_templates(&self) -> Arc<dyn PermissionTemplateRepo> {
        Arc::clone(&self.repos.permission_templates)
    }

    /// Get settings repository
    pub fn settings(&self) -> Arc<dyn SettingsRepo> {
        Arc::clone(&self.repos.settings)
    }

    /// Health check for database connectivity
    pub async fn health_check(&self) -> DbResult<()> {
        match &self.inner {
            #[cfg(feature = "database-sqlite")]
            PoolStorage::Sqlite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            #[cfg(not(feature = "database-sqlite"))]
            PoolStorage::_None(infallible) => match *infallible {},
        }
    }
}
