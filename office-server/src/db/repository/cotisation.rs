//! Dues Repository

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{Cotisation, CotisationDetail, EntrySheetRow, PaymentFilter, UpsertSummary};
use sqlx::{SqliteConnection, SqlitePool};

const COTISATION_SELECT: &str = "SELECT id, membre_id, montant, annee, mois, date_paiement, mode_paiement_id, statut_cotisation_id, reference, notes, enregistre_par, created_at, updated_at FROM cotisation";

const DETAIL_SELECT: &str = "SELECT c.id, c.membre_id, c.montant, c.annee, c.mois, c.date_paiement, c.mode_paiement_id, c.statut_cotisation_id, c.reference, c.notes, c.enregistre_par, c.created_at, c.updated_at, m.nom AS membre_nom, m.prenom AS membre_prenom, m.localite_id, l.libelle AS localite_libelle, s.libelle AS statut_libelle, mp.libelle AS mode_libelle FROM cotisation c JOIN membre m ON m.id = c.membre_id LEFT JOIN localite l ON l.id = m.localite_id LEFT JOIN statut_cotisation s ON s.id = c.statut_cotisation_id LEFT JOIN mode_paiement mp ON mp.id = c.mode_paiement_id";

/// Listing filters: ?1 member, ?2 locality, ?3 year, ?4 month
const FILTER_CLAUSE: &str = "WHERE (?1 IS NULL OR c.membre_id = ?1) AND (?2 IS NULL OR m.localite_id = ?2) AND (?3 IS NULL OR c.annee = ?3) AND (?4 IS NULL OR c.mois = ?4)";

/// Validated dues fields ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct CotisationRecord {
    pub membre_id: i64,
    pub montant: f64,
    pub annee: i32,
    pub mois: i32,
    pub date_paiement: Option<NaiveDate>,
    pub mode_paiement_id: Option<i64>,
    pub statut_cotisation_id: Option<i64>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// Resolved query filters
#[derive(Debug, Clone, Copy, Default)]
pub struct CotisationQuery {
    pub membre_id: Option<i64>,
    pub localite_id: Option<i64>,
    pub annee: Option<i32>,
    pub mois: Option<i32>,
}

/// Payment date and status label of a member's latest dues record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LatestPayment {
    pub membre_id: i64,
    pub date_paiement: Option<NaiveDate>,
    pub statut_libelle: Option<String>,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Cotisation>> {
    let sql = format!("{COTISATION_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Cotisation>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_detail_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<CotisationDetail>> {
    let sql = format!("{DETAIL_SELECT} WHERE c.id = ?");
    let row = sqlx::query_as::<_, CotisationDetail>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Record for the unique (member, year, month) key
pub async fn find_by_key(
    conn: &mut SqliteConnection,
    membre_id: i64,
    annee: i32,
    mois: i32,
) -> RepoResult<Option<Cotisation>> {
    let sql = format!("{COTISATION_SELECT} WHERE membre_id = ?1 AND annee = ?2 AND mois = ?3");
    let row = sqlx::query_as::<_, Cotisation>(&sql)
        .bind(membre_id)
        .bind(annee)
        .bind(mois)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// Filtered listing, most recent payment first (undated records last)
pub async fn list(pool: &SqlitePool, query: &CotisationQuery) -> RepoResult<Vec<CotisationDetail>> {
    let sql = format!(
        "{DETAIL_SELECT} {FILTER_CLAUSE} ORDER BY c.date_paiement DESC, c.created_at DESC, c.id DESC"
    );
    let rows = sqlx::query_as::<_, CotisationDetail>(&sql)
        .bind(query.membre_id)
        .bind(query.localite_id)
        .bind(query.annee)
        .bind(query.mois)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Latest `limit` records, optionally restricted to a dues year
pub async fn latest(
    pool: &SqlitePool,
    annee: Option<i32>,
    limit: i64,
) -> RepoResult<Vec<CotisationDetail>> {
    let sql = format!(
        "{DETAIL_SELECT} WHERE (?1 IS NULL OR c.annee = ?1) ORDER BY c.date_paiement DESC, c.created_at DESC LIMIT ?2"
    );
    let rows = sqlx::query_as::<_, CotisationDetail>(&sql)
        .bind(annee)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Sum of amounts, optionally restricted to a year and month
pub async fn sum_amount(
    pool: &SqlitePool,
    annee: Option<i32>,
    mois: Option<i32>,
) -> RepoResult<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(montant), 0.0) FROM cotisation WHERE (?1 IS NULL OR annee = ?1) AND (?2 IS NULL OR mois = ?2)",
    )
    .bind(annee)
    .bind(mois)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

/// Latest record (by payment date) of one member
pub async fn latest_payment(pool: &SqlitePool, membre_id: i64) -> RepoResult<Option<LatestPayment>> {
    let row = sqlx::query_as::<_, LatestPayment>(
        "SELECT c.membre_id, c.date_paiement, s.libelle AS statut_libelle FROM cotisation c LEFT JOIN statut_cotisation s ON s.id = c.statut_cotisation_id WHERE c.membre_id = ? ORDER BY c.date_paiement DESC, c.created_at DESC, c.id DESC LIMIT 1",
    )
    .bind(membre_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Latest record of every member that has one
pub async fn latest_payments(pool: &SqlitePool) -> RepoResult<Vec<LatestPayment>> {
    let rows = sqlx::query_as::<_, LatestPayment>(
        "SELECT membre_id, date_paiement, statut_libelle FROM (SELECT c.membre_id, c.date_paiement, s.libelle AS statut_libelle, ROW_NUMBER() OVER (PARTITION BY c.membre_id ORDER BY c.date_paiement DESC, c.created_at DESC, c.id DESC) AS rn FROM cotisation c LEFT JOIN statut_cotisation s ON s.id = c.statut_cotisation_id) WHERE rn = 1",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Members for the bulk entry sheet with their amount for the period
pub async fn entry_sheet(
    pool: &SqlitePool,
    annee: i32,
    mois: i32,
    filter: PaymentFilter,
    localite_id: Option<i64>,
) -> RepoResult<Vec<EntrySheetRow>> {
    let filter_key = match filter {
        PaymentFilter::Paid => "paid",
        PaymentFilter::Unpaid => "unpaid",
        PaymentFilter::All => "all",
    };
    let rows = sqlx::query_as::<_, EntrySheetRow>(
        "SELECT m.id AS membre_id, m.prenom, m.nom, m.telephone, c.montant AS montant_existant FROM membre m LEFT JOIN cotisation c ON c.membre_id = m.id AND c.annee = ?1 AND c.mois = ?2 WHERE (?3 IS NULL OR m.localite_id = ?3) AND (?4 = 'all' OR (?4 = 'paid' AND c.id IS NOT NULL) OR (?4 = 'unpaid' AND c.id IS NULL)) ORDER BY m.prenom, m.nom",
    )
    .bind(annee)
    .bind(mois)
    .bind(localite_id)
    .bind(filter_key)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn insert(
    conn: &mut SqliteConnection,
    data: &CotisationRecord,
    enregistre_par: Option<i64>,
) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO cotisation (id, membre_id, montant, annee, mois, date_paiement, mode_paiement_id, statut_cotisation_id, reference, notes, enregistre_par, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(data.membre_id)
    .bind(data.montant)
    .bind(data.annee)
    .bind(data.mois)
    .bind(data.date_paiement)
    .bind(data.mode_paiement_id)
    .bind(data.statut_cotisation_id)
    .bind(&data.reference)
    .bind(&data.notes)
    .bind(enregistre_par)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

/// Overwrite every field of an existing record
pub async fn overwrite(
    conn: &mut SqliteConnection,
    id: i64,
    data: &CotisationRecord,
    enregistre_par: Option<i64>,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE cotisation SET membre_id = ?1, montant = ?2, annee = ?3, mois = ?4, date_paiement = ?5, mode_paiement_id = ?6, statut_cotisation_id = ?7, reference = ?8, notes = ?9, enregistre_par = COALESCE(?10, enregistre_par), updated_at = ?11 WHERE id = ?12",
    )
    .bind(data.membre_id)
    .bind(data.montant)
    .bind(data.annee)
    .bind(data.mois)
    .bind(data.date_paiement)
    .bind(data.mode_paiement_id)
    .bind(data.statut_cotisation_id)
    .bind(&data.reference)
    .bind(&data.notes)
    .bind(enregistre_par)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Cotisation {id} not found")));
    }
    Ok(())
}

/// Insert or overwrite every record on its (member, year, month) key in one
/// transaction
pub async fn upsert_batch(
    pool: &SqlitePool,
    records: &[CotisationRecord],
    enregistre_par: Option<i64>,
) -> RepoResult<UpsertSummary> {
    let mut tx = pool.begin().await?;
    let mut summary = UpsertSummary::default();

    for record in records {
        match find_by_key(&mut *tx, record.membre_id, record.annee, record.mois).await? {
            Some(existing) => {
                overwrite(&mut *tx, existing.id, record, enregistre_par).await?;
                summary.updated += 1;
            }
            None => {
                insert(&mut *tx, record, enregistre_par).await?;
                summary.created += 1;
            }
        }
    }

    tx.commit().await?;
    Ok(summary)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM cotisation WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
