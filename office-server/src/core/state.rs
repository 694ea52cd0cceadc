use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::services::{roles, users};
use crate::storage::{BlobStore, LocalBlobStore};
use crate::utils::{AppError, AppResult};

/// Server state - shared handles to every service
///
/// Cheap to clone: the pool and the blob store are reference counted.
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | config | Config | Configuration (immutable) |
/// | pool | SqlitePool | SQLite connection pool |
/// | blobs | Arc<dyn BlobStore> | Photos and attachments |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub blobs: Arc<dyn BlobStore>,
}

impl ServerState {
    /// Build a state from already opened resources
    ///
    /// Usually [`initialize()`](Self::initialize) is used instead
    pub fn new(config: Config, pool: SqlitePool, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            config,
            pool,
            blobs,
        }
    }

    /// Initialize the server state
    ///
    /// In order:
    /// 1. Working directory structure
    /// 2. Database (`DATABASE_PATH`) with migrations
    /// 3. Blob store rooted at `UPLOAD_DIR`
    /// 4. Seed data (admin role, reference lists, bootstrap admin)
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        for dir in [&config.work_dir, &config.upload_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                AppError::with_message(
                    shared::ErrorCode::ConfigError,
                    format!("Failed to create directory {dir}: {e}"),
                )
            })?;
        }

        let db = DbService::new(&config.database_path).await?;
        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&config.upload_dir));

        let state = Self::new(config.clone(), db.pool, blobs);
        state.seed().await?;
        Ok(state)
    }

    /// Idempotent seed: reserved admin role, default reference lists and
    /// the optional bootstrap administrator
    pub async fn seed(&self) -> AppResult<()> {
        roles::ensure_admin_role(&self.pool).await?;
        crate::db::repository::reference::seed_defaults(&self.pool).await?;
        if let Some(email) = &self.config.admin_email {
            users::ensure_admin_user(&self.pool, email).await?;
        }
        Ok(())
    }
}
