//! Role Repository

use super::{RepoError, RepoResult};
use shared::models::{Role, RoleWithUserCount};
use sqlx::SqlitePool;

const ROLE_SELECT: &str = "SELECT id, nom, slug, description, permissions, actif, created_at, updated_at FROM role";

/// Distinct users holding the role through either representation
const USER_COUNT_EXPR: &str = "(SELECT COUNT(*) FROM utilisateur u WHERE u.role_id = r.id OR EXISTS (SELECT 1 FROM role_utilisateur ru WHERE ru.utilisateur_id = u.id AND ru.role_id = r.id))";

/// Validated role fields ready to be written
#[derive(Debug, Clone)]
pub struct RoleRecord {
    pub nom: String,
    pub slug: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub actif: bool,
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Role>> {
    let sql = format!("{ROLE_SELECT} ORDER BY nom");
    let roles = sqlx::query_as::<_, Role>(&sql).fetch_all(pool).await?;
    Ok(roles)
}

pub async fn find_all_with_user_count(pool: &SqlitePool) -> RepoResult<Vec<RoleWithUserCount>> {
    let sql = format!(
        "SELECT r.id, r.nom, r.slug, r.description, r.permissions, r.actif, r.created_at, r.updated_at, {USER_COUNT_EXPR} AS user_count FROM role r ORDER BY r.nom"
    );
    let rows = sqlx::query_as::<_, RoleWithUserCount>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Role>> {
    let sql = format!("{ROLE_SELECT} WHERE id = ?");
    let role = sqlx::query_as::<_, Role>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(role)
}

pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> RepoResult<Option<Role>> {
    let sql = format!("{ROLE_SELECT} WHERE slug = ? LIMIT 1");
    let role = sqlx::query_as::<_, Role>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(role)
}

/// Whether another role already uses this name
pub async fn name_taken(pool: &SqlitePool, nom: &str, except_id: Option<i64>) -> RepoResult<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM role WHERE nom = ?1 AND (?2 IS NULL OR id != ?2)")
            .bind(nom)
            .bind(except_id)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

/// Roles assigned to a user through the many-to-many table
pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(
        "SELECT r.id, r.nom, r.slug, r.description, r.permissions, r.actif, r.created_at, r.updated_at FROM role r JOIN role_utilisateur ru ON ru.role_id = r.id WHERE ru.utilisateur_id = ? ORDER BY r.nom",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(roles)
}

/// Ids from `ids` that match no role
pub async fn missing_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<i64>> {
    let mut missing = Vec::new();
    for &id in ids {
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM role WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
        if exists == 0 {
            missing.push(id);
        }
    }
    Ok(missing)
}

pub async fn count_users(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let sql = format!("SELECT {USER_COUNT_EXPR} FROM role r WHERE r.id = ?");
    let count: Option<i64> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(count.unwrap_or(0))
}

pub async fn create(pool: &SqlitePool, data: &RoleRecord) -> RepoResult<Role> {
    let now = shared::util::now_millis();
    let permissions_json =
        serde_json::to_string(&data.permissions).unwrap_or_else(|_| "[]".to_string());

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO role (nom, slug, description, permissions, actif, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING id",
    )
    .bind(&data.nom)
    .bind(&data.slug)
    .bind(&data.description)
    .bind(permissions_json)
    .bind(data.actif)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create role".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &RoleRecord) -> RepoResult<Role> {
    let now = shared::util::now_millis();
    let permissions_json =
        serde_json::to_string(&data.permissions).unwrap_or_else(|_| "[]".to_string());

    let rows = sqlx::query(
        "UPDATE role SET nom = ?1, slug = ?2, description = ?3, permissions = ?4, actif = ?5, updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.nom)
    .bind(&data.slug)
    .bind(&data.description)
    .bind(permissions_json)
    .bind(data.actif)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Role {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Role {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM role WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
