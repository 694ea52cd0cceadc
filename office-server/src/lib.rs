//! Office Server - back-office core of the association
//!
//! # Overview
//!
//! - **Authorization** (`auth`): actor resolver over modern and legacy roles,
//!   typed permission registry, guards
//! - **Database** (`db`): embedded SQLite with migrations and repositories
//! - **Storage** (`storage`): blob store for photos and attachments
//! - **Services** (`services`): members, localities, dues, expenses, roles
//!   and users
//! - **Reports** (`reports`): period buckets grouped by locality, roster,
//!   member standing, dashboard
//!
//! # Layout
//!
//! ```text
//! office-server/src/
//! ├── core/          # configuration, state
//! ├── auth/          # resolver, permissions, guards
//! ├── db/            # SQLite pool and repositories
//! ├── storage/       # blob store
//! ├── services/      # business operations
//! ├── reports/       # aggregation engine
//! └── utils/         # logging, validation
//! ```

pub mod auth;
pub mod core;
pub mod db;
pub mod reports;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export common types
pub use auth::{Actor, Permission};
pub use core::{Config, ServerState};
pub use services::RequestContext;
pub use storage::{BlobStore, LocalBlobStore};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($severity:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            severity = $severity,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env` and initialize logging from the environment
pub fn setup_environment() -> Config {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        config.log_dir.as_deref(),
    );
    config
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::{Config, ServerState};
    use crate::db::DbService;
    use crate::db::repository::role::RoleRecord;
    use crate::db::repository::{localite, membre, role, user};
    use crate::services::{RequestContext, users};
    use crate::storage::LocalBlobStore;
    use shared::i18n::Locale;
    use shared::models::{MembreCreate, UserCreate};
    use sqlx::SqlitePool;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// In-memory database and a blob store in a temporary directory, seeded
    pub async fn test_state() -> (ServerState, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path().to_string_lossy().into_owned();
        let config = Config::with_overrides(work_dir);
        let db = DbService::in_memory().await.unwrap();
        let blobs = Arc::new(LocalBlobStore::new(&config.upload_dir));
        let state = ServerState::new(config, db.pool, blobs);
        state.seed().await.unwrap();
        (state, dir)
    }

    /// Bootstrap administrator, loaded the way a request would load it
    pub async fn admin_ctx(state: &ServerState) -> RequestContext {
        let account = users::ensure_admin_user(&state.pool, "admin@zikoboue.test")
            .await
            .unwrap();
        let actor = users::load_actor(&state.pool, account.id).await.unwrap();
        RequestContext::new(actor, Locale::Fr)
    }

    /// Account holding one active role with exactly these permissions
    pub async fn user_ctx(state: &ServerState, permissions: &[&str]) -> RequestContext {
        let tag = shared::util::snowflake_id();
        let agent = role::create(
            &state.pool,
            &RoleRecord {
                nom: format!("Agent {tag}"),
                slug: format!("agent-{tag}"),
                description: None,
                permissions: permissions.iter().map(|p| p.to_string()).collect(),
                actif: true,
            },
        )
        .await
        .unwrap();
        let account = user::create(
            &state.pool,
            &UserCreate {
                email: format!("agent-{tag}@zikoboue.test"),
                role_id: None,
            },
        )
        .await
        .unwrap();
        user::set_roles(&state.pool, account.id, &[agent.id]).await.unwrap();
        let actor = users::load_actor(&state.pool, account.id).await.unwrap();
        RequestContext::new(actor, Locale::Fr)
    }

    pub async fn seed_localite(pool: &SqlitePool, libelle: &str) -> i64 {
        localite::create(pool, libelle).await.unwrap().id
    }

    pub async fn seed_member(pool: &SqlitePool, prenom: &str, localite_id: Option<i64>) -> i64 {
        let data = MembreCreate {
            nom: "Test".into(),
            prenom: prenom.into(),
            localite_id,
            ..Default::default()
        };
        membre::create(pool, &data).await.unwrap().membre.id
    }
}
