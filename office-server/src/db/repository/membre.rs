//! Member Repository

use super::{RepoError, RepoResult};
use shared::models::{
    MEMBRE_ACTIF, MembreCreate, MembreFilters, MembreSummary, MembreUpdate,
    MembreWithLocalite,
};
use sqlx::SqlitePool;

const MEMBRE_WITH_LOCALITE_SELECT: &str = "SELECT m.id, m.utilisateur_id, m.nom, m.prenom, m.telephone, m.localite_id, m.photo_url, m.adresse, m.date_adhesion, m.statut, m.created_at, m.updated_at, l.libelle AS localite_libelle FROM membre m LEFT JOIN localite l ON l.id = m.localite_id";

const MEMBRE_SUMMARY_SELECT: &str = "SELECT m.id, m.utilisateur_id, m.nom, m.prenom, m.telephone, m.localite_id, m.photo_url, m.adresse, m.date_adhesion, m.statut, m.created_at, m.updated_at, l.libelle AS localite_libelle, COALESCE((SELECT SUM(c.montant) FROM cotisation c WHERE c.membre_id = m.id), 0.0) AS total_cotisations, COALESCE((SELECT SUM(COALESCE(d.montant_total, d.montant)) FROM depense_medicale d WHERE d.membre_id = m.id), 0.0) AS total_depenses FROM membre m LEFT JOIN localite l ON l.id = m.localite_id";

/// Search/locality filter: ?1 = LIKE pattern, ?2 = locality id
const FILTER_CLAUSE: &str = "WHERE (?1 IS NULL OR m.nom LIKE ?1 OR m.prenom LIKE ?1 OR m.telephone LIKE ?1) AND (?2 IS NULL OR m.localite_id = ?2)";

fn search_pattern(filters: &MembreFilters) -> Option<String> {
    filters
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MembreWithLocalite>> {
    let sql = format!("{MEMBRE_WITH_LOCALITE_SELECT} WHERE m.id = ?");
    let row = sqlx::query_as::<_, MembreWithLocalite>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn exists(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM membre WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Listing with per-member totals, latest membership date first
pub async fn list(pool: &SqlitePool, filters: &MembreFilters) -> RepoResult<Vec<MembreSummary>> {
    let sql = format!(
        "{MEMBRE_SUMMARY_SELECT} {FILTER_CLAUSE} ORDER BY m.date_adhesion DESC, m.created_at DESC, m.id DESC"
    );
    let rows = sqlx::query_as::<_, MembreSummary>(&sql)
        .bind(search_pattern(filters))
        .bind(filters.localite_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Roster rows ordered by first name
pub async fn roster(
    pool: &SqlitePool,
    filters: &MembreFilters,
) -> RepoResult<Vec<MembreWithLocalite>> {
    let sql = format!("{MEMBRE_WITH_LOCALITE_SELECT} {FILTER_CLAUSE} ORDER BY m.prenom, m.nom");
    let rows = sqlx::query_as::<_, MembreWithLocalite>(&sql)
        .bind(search_pattern(filters))
        .bind(filters.localite_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// (total members, active members)
pub async fn counts(pool: &SqlitePool) -> RepoResult<(i64, i64)> {
    let (total, active): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN statut = ?1 THEN 1 ELSE 0 END), 0) FROM membre",
    )
    .bind(MEMBRE_ACTIF)
    .fetch_one(pool)
    .await?;
    Ok((total, active))
}

pub async fn create(pool: &SqlitePool, data: &MembreCreate) -> RepoResult<MembreWithLocalite> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO membre (id, utilisateur_id, nom, prenom, telephone, localite_id, photo_url, adresse, date_adhesion, statut, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
    )
    .bind(id)
    .bind(data.utilisateur_id)
    .bind(&data.nom)
    .bind(&data.prenom)
    .bind(&data.telephone)
    .bind(data.localite_id)
    .bind(&data.photo_url)
    .bind(&data.adresse)
    .bind(data.date_adhesion)
    .bind(data.statut.unwrap_or(MEMBRE_ACTIF))
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create member".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &MembreUpdate,
) -> RepoResult<MembreWithLocalite> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE membre SET nom = COALESCE(?1, nom), prenom = COALESCE(?2, prenom), telephone = COALESCE(?3, telephone), localite_id = COALESCE(?4, localite_id), photo_url = COALESCE(?5, photo_url), adresse = COALESCE(?6, adresse), date_adhesion = COALESCE(?7, date_adhesion), statut = COALESCE(?8, statut), utilisateur_id = COALESCE(?9, utilisateur_id), updated_at = ?10 WHERE id = ?11",
    )
    .bind(&data.nom)
    .bind(&data.prenom)
    .bind(&data.telephone)
    .bind(data.localite_id)
    .bind(&data.photo_url)
    .bind(&data.adresse)
    .bind(data.date_adhesion)
    .bind(data.statut)
    .bind(data.utilisateur_id)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Member {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))
}

/// Set or clear the photo path
pub async fn set_photo(pool: &SqlitePool, id: i64, photo_url: Option<&str>) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE membre SET photo_url = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(photo_url)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Member {id} not found")));
    }
    Ok(())
}

/// Hard delete (dues and expenses cascade)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM membre WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
