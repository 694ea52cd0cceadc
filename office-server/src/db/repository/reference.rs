//! Reference List Repository (payment statuses, payment modes, expense categories)

use super::RepoResult;
use shared::models::{CategorieDepense, ModePaiement, StatutCotisation};
use sqlx::SqlitePool;

const DEFAULT_STATUTS: &[&str] = &["Payé", "En attente", "Annulé"];
const DEFAULT_MODES: &[&str] = &["Espèces", "Mobile Money", "Virement", "Chèque"];
const DEFAULT_CATEGORIES: &[&str] = &[
    "Consultation",
    "Médicaments",
    "Analyses",
    "Hospitalisation",
];

pub async fn find_statuts(pool: &SqlitePool) -> RepoResult<Vec<StatutCotisation>> {
    let rows = sqlx::query_as::<_, StatutCotisation>(
        "SELECT id, libelle, description FROM statut_cotisation ORDER BY libelle",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Active payment modes
pub async fn find_modes(pool: &SqlitePool) -> RepoResult<Vec<ModePaiement>> {
    let rows = sqlx::query_as::<_, ModePaiement>(
        "SELECT id, libelle, actif FROM mode_paiement WHERE actif = 1 ORDER BY libelle",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_categories(pool: &SqlitePool) -> RepoResult<Vec<CategorieDepense>> {
    let rows = sqlx::query_as::<_, CategorieDepense>(
        "SELECT id, libelle, description, actif FROM categorie_depense ORDER BY libelle",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn exists_in(pool: &SqlitePool, table: &str, id: i64) -> RepoResult<bool> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE id = ?");
    let count: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(pool).await?;
    Ok(count > 0)
}

pub async fn statut_exists(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    exists_in(pool, "statut_cotisation", id).await
}

pub async fn mode_exists(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    exists_in(pool, "mode_paiement", id).await
}

pub async fn categorie_exists(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    exists_in(pool, "categorie_depense", id).await
}

pub async fn create_statut(pool: &SqlitePool, libelle: &str) -> RepoResult<i64> {
    let id: i64 =
        sqlx::query_scalar("INSERT INTO statut_cotisation (libelle) VALUES (?) RETURNING id")
            .bind(libelle)
            .fetch_one(pool)
            .await?;
    Ok(id)
}

pub async fn create_mode(pool: &SqlitePool, libelle: &str) -> RepoResult<i64> {
    let id: i64 =
        sqlx::query_scalar("INSERT INTO mode_paiement (libelle, actif) VALUES (?, 1) RETURNING id")
            .bind(libelle)
            .fetch_one(pool)
            .await?;
    Ok(id)
}

pub async fn create_categorie(pool: &SqlitePool, libelle: &str) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO categorie_depense (libelle, actif) VALUES (?, 1) RETURNING id",
    )
    .bind(libelle)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Fill empty reference tables with the default lists
pub async fn seed_defaults(pool: &SqlitePool) -> RepoResult<()> {
    if find_statuts(pool).await?.is_empty() {
        for libelle in DEFAULT_STATUTS {
            create_statut(pool, libelle).await?;
        }
        tracing::info!(count = DEFAULT_STATUTS.len(), "Seeded payment statuses");
    }
    if find_modes(pool).await?.is_empty() {
        for libelle in DEFAULT_MODES {
            create_mode(pool, libelle).await?;
        }
        tracing::info!(count = DEFAULT_MODES.len(), "Seeded payment modes");
    }
    if find_categories(pool).await?.is_empty() {
        for libelle in DEFAULT_CATEGORIES {
            create_categorie(pool, libelle).await?;
        }
        tracing::info!(count = DEFAULT_CATEGORIES.len(), "Seeded expense categories");
    }
    Ok(())
}
