//! Locality Repository

use super::{RepoError, RepoResult};
use shared::models::Localite;
use sqlx::SqlitePool;

const LOCALITE_SELECT: &str = "SELECT id, libelle, created_at, updated_at FROM localite";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Localite>> {
    let sql = format!("{LOCALITE_SELECT} ORDER BY libelle");
    let rows = sqlx::query_as::<_, Localite>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Localite>> {
    let sql = format!("{LOCALITE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Localite>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, libelle: &str) -> RepoResult<Localite> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO localite (libelle, created_at, updated_at) VALUES (?1, ?2, ?2) RETURNING id",
    )
    .bind(libelle)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create locality".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, libelle: &str) -> RepoResult<Localite> {
    let rows = sqlx::query("UPDATE localite SET libelle = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(libelle)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Locality {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Locality {id} not found")))
}

/// Delete a locality; its members fall back to "no locality"
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM localite WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
