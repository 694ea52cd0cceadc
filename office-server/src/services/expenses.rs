//! Medical expenses (dépenses médicales) and their attachments

use crate::auth::{Permission, require_permission};
use crate::core::ServerState;
use crate::db::repository::attachment::{self, AttachmentRecord};
use crate::db::repository::depense::{self, DepenseQuery, DepenseRecord};
use crate::db::repository::{RepoError, membre, reference};
use crate::reports::{self, PeriodReport, ReportKind};
use crate::storage::{ATTACHMENTS_DIR, StoredBlob, delete_all};
use crate::utils::validation::{
    MAX_NAME_LEN, normalize_optional, parse_period_filter, validate_amount,
    validate_optional_amount, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, amount_overflow};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use shared::error::{ErrorCode, FieldErrors};
use shared::models::{
    AttachmentUpload, CategorieDepense, DepenseDetail, DepenseFilters, DepenseInput,
    ExpenseAttachment,
};
use shared::util::{add_money, to_decimal, to_f64};

use super::{RequestContext, check_upload, resolve_report_filters};

/// Accepted attachment extensions
pub const ATTACHMENT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf"];

/// Expense with its attachments
#[derive(Debug, Clone, Serialize)]
pub struct DepenseWithAttachments {
    #[serde(flatten)]
    pub depense: DepenseDetail,
    pub attachments: Vec<ExpenseAttachment>,
}

/// Attachment content ready to be sent back
#[derive(Debug, Clone)]
pub struct AttachmentDownload {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Total of an expense: base amount plus the delegate's transport.
/// `None` when the sum leaves the Decimal range.
pub fn compute_total(montant: f64, transport: Option<f64>) -> Option<f64> {
    add_money(to_decimal(montant)?, transport.unwrap_or(0.0)).map(to_f64)
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::DepenseNotFound, format!("Expense {id} not found"))
}

fn attachment_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::AttachmentNotFound, format!("Attachment {id} not found"))
}

async fn validate_input(
    state: &ServerState,
    ctx: &RequestContext,
    input: DepenseInput,
) -> AppResult<DepenseRecord> {
    let locale = ctx.locale;
    let mut errors = FieldErrors::new();

    if !membre::exists(&state.pool, input.membre_id).await? {
        errors.add("membre_id", locale.not_exists("membre_id"));
    }
    if !reference::categorie_exists(&state.pool, input.categorie_depense_id).await? {
        errors.add("categorie_depense_id", locale.not_exists("categorie_depense_id"));
    }

    let description = input.description.trim().to_string();
    validate_required_text(&mut errors, locale, "description", &description, MAX_NAME_LEN);
    validate_amount(&mut errors, locale, "montant", input.montant);
    if input.date_depense.is_none() {
        errors.add("date_depense", locale.required("date_depense"));
    }

    let nom_prestataire = normalize_optional(input.nom_prestataire);
    validate_optional_text(&mut errors, locale, "nom_prestataire", &nom_prestataire, MAX_NAME_LEN);
    let personne_deleguee = normalize_optional(input.nom_delegue);
    validate_optional_text(&mut errors, locale, "nom_delegue", &personne_deleguee, MAX_NAME_LEN);
    validate_optional_amount(&mut errors, locale, "montant_transport", input.montant_transport);

    errors.into_result()?;
    let Some(date_depense) = input.date_depense else {
        return Err(AppError::validation(locale.required("date_depense")));
    };
    let montant_total =
        compute_total(input.montant, input.montant_transport).ok_or_else(amount_overflow)?;

    Ok(DepenseRecord {
        membre_id: input.membre_id,
        categorie_depense_id: input.categorie_depense_id,
        description,
        montant: input.montant,
        date_depense,
        nom_prestataire,
        personne_deleguee,
        transport_pers_deleguee: input.montant_transport,
        montant_total,
    })
}

fn check_uploads(state: &ServerState, ctx: &RequestContext, uploads: &[AttachmentUpload]) -> AppResult<()> {
    for (index, upload) in uploads.iter().enumerate() {
        check_upload(
            ctx.locale,
            &format!("attachments.{index}"),
            upload,
            ATTACHMENT_EXTENSIONS,
            state.config.max_upload_bytes,
        )?;
    }
    Ok(())
}

/// Write uploads to the blob store; already stored blobs are removed if a
/// later one fails
async fn store_uploads(
    state: &ServerState,
    uploads: &[AttachmentUpload],
) -> AppResult<Vec<(StoredBlob, String)>> {
    let mut stored = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let result = state
            .blobs
            .store(ATTACHMENTS_DIR, &upload.original_name, upload.mime.as_deref(), &upload.bytes)
            .await;
        match result {
            Ok(blob) => stored.push((blob, upload.original_name.clone())),
            Err(e) => {
                let paths: Vec<String> = stored.iter().map(|(b, _)| b.path.clone()).collect();
                delete_all(state.blobs.as_ref(), &paths).await;
                return Err(e.into());
            }
        }
    }
    Ok(stored)
}

fn attachment_record(blob: &StoredBlob, original_name: &str) -> AttachmentRecord {
    AttachmentRecord {
        chemin_fichier: blob.path.clone(),
        nom_fichier: original_name.to_string(),
        type_mime: blob.mime.clone(),
        taille_fichier: blob.size as i64,
    }
}

async fn load(state: &ServerState, id: i64) -> AppResult<DepenseWithAttachments> {
    let depense = depense::find_detail_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let attachments = attachment::find_by_depense(&state.pool, id).await?;
    Ok(DepenseWithAttachments {
        depense,
        attachments,
    })
}

pub async fn get_depense(
    state: &ServerState,
    ctx: &RequestContext,
    id: i64,
) -> AppResult<DepenseWithAttachments> {
    require_permission(&ctx.actor, Permission::DepensesView)?;
    load(state, id).await
}

/// Record an expense with its attachments
///
/// Blobs are written before the rows; the expense and its attachment rows
/// are inserted in one transaction.
pub async fn create_depense(
    state: &ServerState,
    ctx: &RequestContext,
    input: DepenseInput,
    uploads: Vec<AttachmentUpload>,
) -> AppResult<DepenseWithAttachments> {
    require_permission(&ctx.actor, Permission::DepensesCreate)?;
    let record = validate_input(state, ctx, input).await?;
    check_uploads(state, ctx, &uploads)?;

    let stored = store_uploads(state, &uploads).await?;

    let mut tx = state.pool.begin().await.map_err(RepoError::from)?;
    let id = depense::insert(&mut *tx, &record, Some(ctx.user_id())).await?;
    for (blob, name) in &stored {
        attachment::insert(&mut *tx, id, &attachment_record(blob, name)).await?;
    }
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        user_id = ctx.user_id(),
        depense_id = id,
        membre_id = record.membre_id,
        montant_total = record.montant_total,
        attachments = stored.len(),
        "Expense recorded"
    );
    load(state, id).await
}

/// Update an expense; new uploads are added to the existing attachments
pub async fn update_depense(
    state: &ServerState,
    ctx: &RequestContext,
    id: i64,
    input: DepenseInput,
    uploads: Vec<AttachmentUpload>,
) -> AppResult<DepenseWithAttachments> {
    require_permission(&ctx.actor, Permission::DepensesEdit)?;
    if depense::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found(id));
    }
    let record = validate_input(state, ctx, input).await?;
    check_uploads(state, ctx, &uploads)?;

    let stored = store_uploads(state, &uploads).await?;

    let mut tx = state.pool.begin().await.map_err(RepoError::from)?;
    depense::update(&mut *tx, id, &record).await?;
    for (blob, name) in &stored {
        attachment::insert(&mut *tx, id, &attachment_record(blob, name)).await?;
    }
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(user_id = ctx.user_id(), depense_id = id, "Expense updated");
    load(state, id).await
}

/// Delete an expense: blobs first, then the row (attachment rows cascade)
pub async fn delete_depense(state: &ServerState, ctx: &RequestContext, id: i64) -> AppResult<()> {
    require_permission(&ctx.actor, Permission::DepensesDelete)?;
    if depense::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found(id));
    }

    let paths: Vec<String> = attachment::find_by_depense(&state.pool, id)
        .await?
        .into_iter()
        .map(|a| a.chemin_fichier)
        .collect();
    delete_all(state.blobs.as_ref(), &paths).await;

    if !depense::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = ctx.user_id(), depense_id = id, "Expense deleted");
    Ok(())
}

pub async fn download_attachment(
    state: &ServerState,
    ctx: &RequestContext,
    attachment_id: i64,
) -> AppResult<AttachmentDownload> {
    require_permission(&ctx.actor, Permission::DepensesView)?;
    let found = attachment::find_by_id(&state.pool, attachment_id)
        .await?
        .ok_or_else(|| attachment_not_found(attachment_id))?;
    let bytes = state.blobs.read(&found.chemin_fichier).await?;
    Ok(AttachmentDownload {
        file_name: found.nom_fichier,
        mime: found.type_mime,
        bytes,
    })
}

pub async fn delete_attachment(
    state: &ServerState,
    ctx: &RequestContext,
    attachment_id: i64,
) -> AppResult<()> {
    require_permission(&ctx.actor, Permission::DepensesEdit)?;
    let found = attachment::find_by_id(&state.pool, attachment_id)
        .await?
        .ok_or_else(|| attachment_not_found(attachment_id))?;
    state.blobs.delete(&found.chemin_fichier).await?;
    match attachment::delete(&state.pool, attachment_id).await {
        Ok(()) => {}
        Err(RepoError::NotFound(_)) => return Err(attachment_not_found(attachment_id)),
        Err(e) => return Err(e.into()),
    }
    tracing::info!(
        user_id = ctx.user_id(),
        attachment_id,
        depense_id = found.depense_medicale_id,
        "Attachment deleted"
    );
    Ok(())
}

pub async fn list_depenses(
    state: &ServerState,
    ctx: &RequestContext,
    filters: &DepenseFilters,
) -> AppResult<Vec<DepenseDetail>> {
    require_permission(&ctx.actor, Permission::DepensesView)?;
    let (annee, mois) =
        parse_period_filter(ctx.locale, filters.annee.as_deref(), filters.mois.as_deref())
            .map_err(|errors| AppError::invalid_fields(&errors))?;
    let query = DepenseQuery {
        membre_id: filters.membre_id,
        localite_id: filters.localite_id,
        annee,
        mois: mois.map(|m| m as i32),
    };
    Ok(depense::list(&state.pool, &query).await?)
}

/// Printable expense report: period sections grouped by locality
pub async fn print_report(
    state: &ServerState,
    ctx: &RequestContext,
    filters: &DepenseFilters,
    today: NaiveDate,
) -> AppResult<PeriodReport<DepenseDetail>> {
    require_permission(&ctx.actor, Permission::DepensesView)?;
    let report_filters = resolve_report_filters(
        &state.pool,
        ctx,
        filters.membre_id,
        filters.localite_id,
        filters.annee.as_deref(),
        filters.mois.as_deref(),
    )
    .await?;

    let query = DepenseQuery {
        membre_id: report_filters.membre_id,
        localite_id: report_filters.locality.as_ref().map(|l| l.id),
        annee: Some(report_filters.year.unwrap_or(today.year())),
        mois: report_filters.month.map(|m| m as i32),
    };
    let records = depense::list(&state.pool, &query).await?;
    tracing::debug!(records = records.len(), "Expense report data loaded");

    reports::build_report(
        ReportKind::Expenses,
        records,
        &report_filters,
        today,
        ctx.locale,
        &state.config.association_name,
    )
}

pub async fn list_categories(
    state: &ServerState,
    ctx: &RequestContext,
) -> AppResult<Vec<CategorieDepense>> {
    require_permission(&ctx.actor, Permission::DepensesView)?;
    Ok(reference::find_categories(&state.pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin_ctx, seed_member, test_state};

    async fn expense_input(state: &ServerState, membre_id: i64) -> DepenseInput {
        let categorie = reference::find_categories(&state.pool).await.unwrap()[0].id;
        DepenseInput {
            membre_id,
            categorie_depense_id: categorie,
            description: "Consultation pédiatrique".into(),
            montant: 15000.0,
            date_depense: NaiveDate::from_ymd_opt(2026, 9, 3),
            nom_prestataire: Some("Clinique Sainte Anne".into()),
            nom_delegue: Some("Koffi".into()),
            montant_transport: Some(2500.0),
        }
    }

    fn pdf(name: &str) -> AttachmentUpload {
        AttachmentUpload {
            original_name: name.into(),
            mime: Some("application/pdf".into()),
            bytes: b"%PDF-1.4 test".to_vec(),
        }
    }

    #[test]
    fn test_compute_total() {
        assert_eq!(compute_total(100.0, None), Some(100.0));
        assert_eq!(compute_total(100.0, Some(25.5)), Some(125.5));
        assert_eq!(compute_total(0.1, Some(0.2)), Some(0.3));
        assert_eq!(compute_total(5e28, Some(5e28)), None);
    }

    #[tokio::test]
    async fn test_create_derives_total_and_stores_attachments() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let membre_id = seed_member(&state.pool, "Awa", None).await;
        let input = expense_input(&state, membre_id).await;

        let created = create_depense(&state, &ctx, input, vec![pdf("ordonnance.pdf")])
            .await
            .unwrap();

        assert_eq!(created.depense.depense.montant_total, Some(17500.0));
        assert_eq!(created.depense.depense.personne_deleguee.as_deref(), Some("Koffi"));
        assert_eq!(created.attachments.len(), 1);
        let stored = &created.attachments[0];
        assert_eq!(stored.nom_fichier, "ordonnance.pdf");
        assert!(stored.chemin_fichier.starts_with("depenses-attachments/"));
        assert!(stored.chemin_fichier.ends_with(".pdf"));
        assert!(state.blobs.exists(&stored.chemin_fichier).await);

        let download = download_attachment(&state, &ctx, stored.id).await.unwrap();
        assert_eq!(download.bytes, b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn test_update_recomputes_total() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let membre_id = seed_member(&state.pool, "Awa", None).await;
        let created = create_depense(&state, &ctx, expense_input(&state, membre_id).await, vec![])
            .await
            .unwrap();

        let mut input = expense_input(&state, membre_id).await;
        input.montant = 20000.0;
        input.montant_transport = None;
        let updated = update_depense(&state, &ctx, created.depense.depense.id, input, vec![])
            .await
            .unwrap();
        assert_eq!(updated.depense.depense.montant_total, Some(20000.0));
    }

    #[tokio::test]
    async fn test_invalid_input_collects_every_field() {
        let (state, _dir) = test_state().await;
        let input = DepenseInput {
            membre_id: 1,
            categorie_depense_id: 999,
            description: " ".into(),
            montant: -1.0,
            date_depense: None,
            montant_transport: Some(-3.0),
            ..Default::default()
        };
        let err = create_depense(&state, &admin_ctx(&state).await, input, vec![]).await.unwrap_err();
        let fields = err.field_errors().unwrap();
        for field in [
            "membre_id",
            "categorie_depense_id",
            "description",
            "montant",
            "date_depense",
            "montant_transport",
        ] {
            assert!(fields.contains(field), "missing {field}");
        }
    }

    #[tokio::test]
    async fn test_amounts_beyond_the_cap_are_rejected() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let membre_id = seed_member(&state.pool, "Awa", None).await;
        let mut input = expense_input(&state, membre_id).await;
        input.montant = 5e28;
        input.montant_transport = Some(5e28);

        let err = create_depense(&state, &ctx, input, vec![]).await.unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains("montant"));
        assert!(fields.contains("montant_transport"));
        assert!(list_depenses(&state, &ctx, &Default::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_attachment_writes_nothing() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let membre_id = seed_member(&state.pool, "Awa", None).await;
        let input = expense_input(&state, membre_id).await;

        let err = create_depense(&state, &ctx, input, vec![pdf("ok.pdf"), pdf("virus.exe")])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFileFormat);

        let rows = depense::list(&state.pool, &DepenseQuery::default()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_blobs() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let membre_id = seed_member(&state.pool, "Awa", None).await;
        let created = create_depense(
            &state,
            &ctx,
            expense_input(&state, membre_id).await,
            vec![pdf("a.pdf"), pdf("b.pdf")],
        )
        .await
        .unwrap();
        let paths: Vec<String> = created
            .attachments
            .iter()
            .map(|a| a.chemin_fichier.clone())
            .collect();

        delete_depense(&state, &ctx, created.depense.depense.id).await.unwrap();
        for path in &paths {
            assert!(!state.blobs.exists(path).await);
        }
        let err = get_depense(&state, &ctx, created.depense.depense.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DepenseNotFound);
    }

    #[tokio::test]
    async fn test_download_missing_blob_is_not_found() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let membre_id = seed_member(&state.pool, "Awa", None).await;
        let created = create_depense(
            &state,
            &ctx,
            expense_input(&state, membre_id).await,
            vec![pdf("a.pdf")],
        )
        .await
        .unwrap();
        let stored = &created.attachments[0];
        state.blobs.delete(&stored.chemin_fichier).await.unwrap();

        let err = download_attachment(&state, &ctx, stored.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AttachmentNotFound);
    }

    #[tokio::test]
    async fn test_print_report_sums_effective_amounts() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let membre_id = seed_member(&state.pool, "Awa", None).await;
        create_depense(&state, &ctx, expense_input(&state, membre_id).await, vec![])
            .await
            .unwrap();

        let filters = DepenseFilters {
            annee: Some("2026".into()),
            mois: Some("09".into()),
            ..Default::default()
        };
        let report = print_report(&state, &ctx, &filters, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
            .await
            .unwrap();
        assert_eq!(report.buckets.len(), 1);
        assert_eq!(report.buckets[0].subtitle, "Septembre 2026");
        assert_eq!(report.buckets[0].total, rust_decimal::Decimal::from(17500));
    }
}
