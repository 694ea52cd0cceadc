//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{User, UserCreate};
use sqlx::SqlitePool;

const USER_SELECT: &str =
    "SELECT id, email, role_id, est_bloque, dernier_login, created_at, updated_at FROM utilisateur";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let sql = format!("{USER_SELECT} ORDER BY email");
    let users = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;
    Ok(users)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE email = ? LIMIT 1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn create(pool: &SqlitePool, data: &UserCreate) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO utilisateur (email, role_id, est_bloque, created_at, updated_at) VALUES (?1, ?2, 0, ?3, ?3) RETURNING id",
    )
    .bind(&data.email)
    .bind(data.role_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Replace the user's many-to-many role set
pub async fn set_roles(pool: &SqlitePool, user_id: i64, role_ids: &[i64]) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM role_utilisateur WHERE utilisateur_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for &role_id in role_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO role_utilisateur (utilisateur_id, role_id) VALUES (?1, ?2)",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("UPDATE utilisateur SET updated_at = ? WHERE id = ?")
        .bind(shared::util::now_millis())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Set or clear the legacy single-role reference
pub async fn set_legacy_role(
    pool: &SqlitePool,
    user_id: i64,
    role_id: Option<i64>,
) -> RepoResult<User> {
    let rows = sqlx::query("UPDATE utilisateur SET role_id = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(role_id)
        .bind(shared::util::now_millis())
        .bind(user_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {user_id} not found")));
    }
    find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {user_id} not found")))
}

pub async fn set_blocked(pool: &SqlitePool, user_id: i64, blocked: bool) -> RepoResult<User> {
    let rows =
        sqlx::query("UPDATE utilisateur SET est_bloque = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(blocked)
            .bind(shared::util::now_millis())
            .bind(user_id)
            .execute(pool)
            .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {user_id} not found")));
    }
    find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {user_id} not found")))
}
