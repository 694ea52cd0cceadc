//! Prepares the working directory: database with migrations, blob store
//! directories and seed data (admin role, reference lists, bootstrap
//! administrator).

use anyhow::Context;
use office_server::db::repository::{localite, membre, role};
use office_server::{ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, logging)
    let config = setup_environment();

    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        locale = %config.locale,
        "Office server starting..."
    );

    // 2. Database, blob store, seed data
    let state = ServerState::initialize(&config)
        .await
        .context("failed to initialize server state")?;

    let (members, active) = membre::counts(&state.pool)
        .await
        .context("failed to count members")?;
    let roles = role::find_all(&state.pool).await.context("failed to load roles")?;
    let localites = localite::find_all(&state.pool)
        .await
        .context("failed to load localities")?;

    tracing::info!(
        database = %config.database_path,
        uploads = %config.upload_dir,
        members,
        active,
        roles = roles.len(),
        localites = localites.len(),
        "Office data ready"
    );

    Ok(())
}
