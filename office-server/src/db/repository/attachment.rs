//! Expense Attachment Repository

use super::{RepoError, RepoResult};
use shared::models::ExpenseAttachment;
use sqlx::{SqliteConnection, SqlitePool};

const ATTACHMENT_SELECT: &str = "SELECT id, depense_medicale_id, chemin_fichier, nom_fichier, type_mime, taille_fichier, description, created_at FROM expense_attachment";

/// Metadata of a stored blob to link to an expense
#[derive(Debug, Clone)]
pub struct AttachmentRecord {
    pub chemin_fichier: String,
    pub nom_fichier: String,
    pub type_mime: Option<String>,
    pub taille_fichier: i64,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ExpenseAttachment>> {
    let sql = format!("{ATTACHMENT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, ExpenseAttachment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_depense(
    pool: &SqlitePool,
    depense_id: i64,
) -> RepoResult<Vec<ExpenseAttachment>> {
    let sql = format!("{ATTACHMENT_SELECT} WHERE depense_medicale_id = ? ORDER BY created_at, id");
    let rows = sqlx::query_as::<_, ExpenseAttachment>(&sql)
        .bind(depense_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Blob paths of every attachment of a member's expenses
pub async fn paths_for_member(pool: &SqlitePool, membre_id: i64) -> RepoResult<Vec<String>> {
    let rows: Vec<String> = sqlx::query_scalar(
        "SELECT a.chemin_fichier FROM expense_attachment a JOIN depense_medicale d ON d.id = a.depense_medicale_id WHERE d.membre_id = ?",
    )
    .bind(membre_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn insert(
    conn: &mut SqliteConnection,
    depense_id: i64,
    data: &AttachmentRecord,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO expense_attachment (id, depense_medicale_id, chemin_fichier, nom_fichier, type_mime, taille_fichier, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(id)
    .bind(depense_id)
    .bind(&data.chemin_fichier)
    .bind(&data.nom_fichier)
    .bind(&data.type_mime)
    .bind(data.taille_fichier)
    .bind(shared::util::now_millis())
    .execute(conn)
    .await?;
    Ok(id)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM expense_attachment WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Attachment {id} not found")));
    }
    Ok(())
}
