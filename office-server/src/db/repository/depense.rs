//! Medical Expense Repository

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{DepenseDetail, DepenseMedicale};
use sqlx::{SqliteConnection, SqlitePool};

const DEPENSE_SELECT: &str = "SELECT id, membre_id, categorie_depense_id, description, montant, date_depense, nom_prestataire, personne_deleguee, transport_pers_deleguee, montant_total, utilisateur_id, created_at, updated_at FROM depense_medicale";

const DETAIL_SELECT: &str = "SELECT d.id, d.membre_id, d.categorie_depense_id, d.description, d.montant, d.date_depense, d.nom_prestataire, d.personne_deleguee, d.transport_pers_deleguee, d.montant_total, d.utilisateur_id, d.created_at, d.updated_at, m.nom AS membre_nom, m.prenom AS membre_prenom, m.localite_id, l.libelle AS localite_libelle, cd.libelle AS categorie_libelle FROM depense_medicale d JOIN membre m ON m.id = d.membre_id LEFT JOIN localite l ON l.id = m.localite_id LEFT JOIN categorie_depense cd ON cd.id = d.categorie_depense_id";

/// Listing filters: ?1 member, ?2 locality, ?3 year, ?4 month (of the expense date)
const FILTER_CLAUSE: &str = "WHERE (?1 IS NULL OR d.membre_id = ?1) AND (?2 IS NULL OR m.localite_id = ?2) AND (?3 IS NULL OR CAST(strftime('%Y', d.date_depense) AS INTEGER) = ?3) AND (?4 IS NULL OR CAST(strftime('%m', d.date_depense) AS INTEGER) = ?4)";

/// Effective amount of one row: derived total, else base amount
const EFFECTIVE_AMOUNT: &str = "COALESCE(montant_total, montant)";

/// Validated expense fields ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct DepenseRecord {
    pub membre_id: i64,
    pub categorie_depense_id: i64,
    pub description: String,
    pub montant: f64,
    pub date_depense: NaiveDate,
    pub nom_prestataire: Option<String>,
    pub personne_deleguee: Option<String>,
    pub transport_pers_deleguee: Option<f64>,
    pub montant_total: f64,
}

/// Resolved query filters
#[derive(Debug, Clone, Copy, Default)]
pub struct DepenseQuery {
    pub membre_id: Option<i64>,
    pub localite_id: Option<i64>,
    pub annee: Option<i32>,
    pub mois: Option<i32>,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DepenseMedicale>> {
    let sql = format!("{DEPENSE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, DepenseMedicale>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_detail_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DepenseDetail>> {
    let sql = format!("{DETAIL_SELECT} WHERE d.id = ?");
    let row = sqlx::query_as::<_, DepenseDetail>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Filtered listing, most recent expense first
pub async fn list(pool: &SqlitePool, query: &DepenseQuery) -> RepoResult<Vec<DepenseDetail>> {
    let sql = format!(
        "{DETAIL_SELECT} {FILTER_CLAUSE} ORDER BY d.date_depense DESC, d.created_at DESC, d.id DESC"
    );
    let rows = sqlx::query_as::<_, DepenseDetail>(&sql)
        .bind(query.membre_id)
        .bind(query.localite_id)
        .bind(query.annee)
        .bind(query.mois)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Latest `limit` expenses, optionally restricted to a calendar year
pub async fn latest(
    pool: &SqlitePool,
    annee: Option<i32>,
    limit: i64,
) -> RepoResult<Vec<DepenseDetail>> {
    let sql = format!(
        "{DETAIL_SELECT} WHERE (?1 IS NULL OR CAST(strftime('%Y', d.date_depense) AS INTEGER) = ?1) ORDER BY d.date_depense DESC, d.created_at DESC LIMIT ?2"
    );
    let rows = sqlx::query_as::<_, DepenseDetail>(&sql)
        .bind(annee)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Sum of effective amounts, optionally restricted to a year and month
pub async fn sum_effective(
    pool: &SqlitePool,
    annee: Option<i32>,
    mois: Option<i32>,
) -> RepoResult<f64> {
    let sql = format!(
        "SELECT COALESCE(SUM({EFFECTIVE_AMOUNT}), 0.0) FROM depense_medicale WHERE (?1 IS NULL OR CAST(strftime('%Y', date_depense) AS INTEGER) = ?1) AND (?2 IS NULL OR CAST(strftime('%m', date_depense) AS INTEGER) = ?2)"
    );
    let total: f64 = sqlx::query_scalar(&sql)
        .bind(annee)
        .bind(mois)
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn insert(
    conn: &mut SqliteConnection,
    data: &DepenseRecord,
    utilisateur_id: Option<i64>,
) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO depense_medicale (id, membre_id, categorie_depense_id, description, montant, date_depense, nom_prestataire, personne_deleguee, transport_pers_deleguee, montant_total, utilisateur_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(data.membre_id)
    .bind(data.categorie_depense_id)
    .bind(&data.description)
    .bind(data.montant)
    .bind(data.date_depense)
    .bind(&data.nom_prestataire)
    .bind(&data.personne_deleguee)
    .bind(data.transport_pers_deleguee)
    .bind(data.montant_total)
    .bind(utilisateur_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

pub async fn update(conn: &mut SqliteConnection, id: i64, data: &DepenseRecord) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE depense_medicale SET membre_id = ?1, categorie_depense_id = ?2, description = ?3, montant = ?4, date_depense = ?5, nom_prestataire = ?6, personne_deleguee = ?7, transport_pers_deleguee = ?8, montant_total = ?9, updated_at = ?10 WHERE id = ?11",
    )
    .bind(data.membre_id)
    .bind(data.categorie_depense_id)
    .bind(&data.description)
    .bind(data.montant)
    .bind(data.date_depense)
    .bind(&data.nom_prestataire)
    .bind(&data.personne_deleguee)
    .bind(data.transport_pers_deleguee)
    .bind(data.montant_total)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Depense {id} not found")));
    }
    Ok(())
}

/// Delete an expense (attachment rows cascade)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM depense_medicale WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
