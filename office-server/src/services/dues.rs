//! Dues (cotisations)
//!
//! Single records, the bulk entry sheet with its upsert, member standing and
//! the printable period report.

use crate::auth::{Permission, require_permission};
use crate::core::ServerState;
use crate::db::repository::cotisation::{self, CotisationQuery, CotisationRecord};
use crate::db::repository::{RepoError, membre, reference};
use crate::reports::{self, PeriodReport, ReportKind};
use crate::utils::validation::{
    MAX_NAME_LEN, normalize_optional, parse_period_filter, validate_amount,
    validate_month, validate_optional_text, validate_year,
};
use crate::utils::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use shared::error::{ErrorCode, FieldErrors};
use shared::i18n::Locale;
use shared::models::{
    CotisationDetail, CotisationFilters, CotisationInput, EntrySheet, MemberStanding,
    ModePaiement, PaymentFilter, StatutCotisation, UpsertSummary,
};
use sqlx::SqlitePool;

use super::{RequestContext, resolve_report_filters};

/// Result of a bulk submission
#[derive(Debug, Clone, Serialize)]
pub struct BulkUpsertOutcome {
    pub summary: UpsertSummary,
    pub message: String,
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::CotisationNotFound, format!("Dues record {id} not found"))
}

fn duplicate_key(record: &CotisationRecord) -> AppError {
    AppError::with_message(
        ErrorCode::AlreadyExists,
        format!(
            "Dues already recorded for member {} in {}-{:02}",
            record.membre_id, record.annee, record.mois
        ),
    )
    .with_detail("membre_id", record.membre_id)
    .with_detail("annee", record.annee)
    .with_detail("mois", record.mois)
}

/// Validate one submission into `errors`; returns the record only when this
/// submission alone is valid
async fn check_input(
    pool: &SqlitePool,
    locale: Locale,
    input: &CotisationInput,
    errors: &mut FieldErrors,
) -> AppResult<Option<CotisationRecord>> {
    let before = errors.len();

    if !membre::exists(pool, input.membre_id).await? {
        errors.add("membre_id", locale.not_exists("membre_id"));
    }
    validate_amount(errors, locale, "montant", input.montant);
    let annee = validate_year(errors, locale, "annee", &input.annee);
    let mois = validate_month(errors, locale, "mois", &input.mois);

    if let Some(id) = input.mode_paiement_id
        && !reference::mode_exists(pool, id).await?
    {
        errors.add("mode_paiement_id", locale.not_exists("mode_paiement_id"));
    }
    if let Some(id) = input.statut_cotisation_id
        && !reference::statut_exists(pool, id).await?
    {
        errors.add("statut_cotisation_id", locale.not_exists("statut_cotisation_id"));
    }

    let reference = normalize_optional(input.reference.clone());
    validate_optional_text(errors, locale, "reference", &reference, MAX_NAME_LEN);

    if errors.len() > before {
        return Ok(None);
    }
    let (Some(annee), Some(mois)) = (annee, mois) else {
        return Ok(None);
    };
    Ok(Some(CotisationRecord {
        membre_id: input.membre_id,
        montant: input.montant,
        annee,
        mois: mois as i32,
        date_paiement: input.date_paiement,
        mode_paiement_id: input.mode_paiement_id,
        statut_cotisation_id: input.statut_cotisation_id,
        reference,
        notes: normalize_optional(input.notes.clone()),
    }))
}

async fn validated(
    pool: &SqlitePool,
    locale: Locale,
    input: &CotisationInput,
) -> AppResult<CotisationRecord> {
    let mut errors = FieldErrors::new();
    match check_input(pool, locale, input, &mut errors).await? {
        Some(record) => Ok(record),
        None => Err(AppError::invalid_fields(&errors)),
    }
}

async fn find_detail(pool: &SqlitePool, id: i64) -> AppResult<CotisationDetail> {
    cotisation::find_detail_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn get_cotisation(
    state: &ServerState,
    ctx: &RequestContext,
    id: i64,
) -> AppResult<CotisationDetail> {
    require_permission(&ctx.actor, Permission::CotisationsView)?;
    find_detail(&state.pool, id).await
}

/// Record one payment; a second record for the same member and month is
/// refused
pub async fn create_cotisation(
    state: &ServerState,
    ctx: &RequestContext,
    input: CotisationInput,
) -> AppResult<CotisationDetail> {
    require_permission(&ctx.actor, Permission::CotisationsCreate)?;
    let record = validated(&state.pool, ctx.locale, &input).await?;

    let mut conn = state.pool.acquire().await.map_err(RepoError::from)?;
    let id = match cotisation::insert(&mut *conn, &record, Some(ctx.user_id())).await {
        Ok(id) => id,
        Err(RepoError::Duplicate(_)) => return Err(duplicate_key(&record)),
        Err(e) => return Err(e.into()),
    };
    drop(conn);

    tracing::info!(
        user_id = ctx.user_id(),
        cotisation_id = id,
        membre_id = record.membre_id,
        montant = record.montant,
        "Dues recorded"
    );
    find_detail(&state.pool, id).await
}

pub async fn update_cotisation(
    state: &ServerState,
    ctx: &RequestContext,
    id: i64,
    input: CotisationInput,
) -> AppResult<CotisationDetail> {
    require_permission(&ctx.actor, Permission::CotisationsEdit)?;
    if cotisation::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found(id));
    }
    let record = validated(&state.pool, ctx.locale, &input).await?;

    let mut conn = state.pool.acquire().await.map_err(RepoError::from)?;
    match cotisation::overwrite(&mut *conn, id, &record, Some(ctx.user_id())).await {
        Ok(()) => {}
        Err(RepoError::Duplicate(_)) => return Err(duplicate_key(&record)),
        Err(RepoError::NotFound(_)) => return Err(not_found(id)),
        Err(e) => return Err(e.into()),
    }
    drop(conn);

    tracing::info!(user_id = ctx.user_id(), cotisation_id = id, "Dues updated");
    find_detail(&state.pool, id).await
}

pub async fn delete_cotisation(state: &ServerState, ctx: &RequestContext, id: i64) -> AppResult<()> {
    require_permission(&ctx.actor, Permission::CotisationsDelete)?;
    if !cotisation::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = ctx.user_id(), cotisation_id = id, "Dues deleted");
    Ok(())
}

/// Bulk submission from the entry sheet
///
/// Every item is validated first (messages keyed `cotisations.<index>.<field>`);
/// a single invalid item rejects the whole batch. Valid batches are applied
/// in one transaction: existing (member, year, month) records are
/// overwritten, others inserted.
pub async fn bulk_upsert(
    state: &ServerState,
    ctx: &RequestContext,
    inputs: Vec<CotisationInput>,
) -> AppResult<BulkUpsertOutcome> {
    require_permission(&ctx.actor, Permission::CotisationsCreate)?;
    if inputs.is_empty() {
        return Err(AppError::with_message(ErrorCode::BatchEmpty, ctx.locale.empty_batch()));
    }

    let mut errors = FieldErrors::new();
    let mut records = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let mut item_errors = FieldErrors::new();
        if let Some(record) = check_input(&state.pool, ctx.locale, input, &mut item_errors).await? {
            records.push(record);
        }
        errors.merge_prefixed(&format!("cotisations.{index}"), item_errors);
    }
    errors.into_result()?;

    let summary = cotisation::upsert_batch(&state.pool, &records, Some(ctx.user_id())).await?;
    tracing::info!(
        user_id = ctx.user_id(),
        created = summary.created,
        updated = summary.updated,
        "Dues batch applied"
    );
    Ok(BulkUpsertOutcome {
        message: ctx.locale.upsert_summary(summary.created, summary.updated),
        summary,
    })
}

/// Members to fill in for one month, with what they already paid
///
/// Year and month default to today's.
pub async fn entry_sheet(
    state: &ServerState,
    ctx: &RequestContext,
    annee: Option<&str>,
    mois: Option<&str>,
    filtre: PaymentFilter,
    localite_id: Option<i64>,
    today: NaiveDate,
) -> AppResult<EntrySheet> {
    require_permission(&ctx.actor, Permission::CotisationsCreate)?;
    let (year, month) = parse_period_filter(ctx.locale, annee, mois)
        .map_err(|errors| AppError::invalid_fields(&errors))?;
    let annee = year.unwrap_or(today.year());
    let mois = month.unwrap_or(today.month()) as i32;

    let rows = cotisation::entry_sheet(&state.pool, annee, mois, filtre, localite_id).await?;
    Ok(EntrySheet {
        annee,
        mois,
        filtre,
        localite_id,
        rows,
    })
}

fn resolve_period(
    ctx: &RequestContext,
    filters: &CotisationFilters,
) -> AppResult<(Option<i32>, Option<u32>)> {
    parse_period_filter(ctx.locale, filters.annee.as_deref(), filters.mois.as_deref())
        .map_err(|errors| AppError::invalid_fields(&errors))
}

pub async fn list_cotisations(
    state: &ServerState,
    ctx: &RequestContext,
    filters: &CotisationFilters,
) -> AppResult<Vec<CotisationDetail>> {
    require_permission(&ctx.actor, Permission::CotisationsView)?;
    let (annee, mois) = resolve_period(ctx, filters)?;
    let query = CotisationQuery {
        membre_id: filters.membre_id,
        localite_id: filters.localite_id,
        annee,
        mois: mois.map(|m| m as i32),
    };
    Ok(cotisation::list(&state.pool, &query).await?)
}

/// Whether a member is up to date with their dues on `today`
pub async fn member_standing(
    state: &ServerState,
    ctx: &RequestContext,
    membre_id: i64,
    today: NaiveDate,
) -> AppResult<MemberStanding> {
    require_permission(&ctx.actor, Permission::MembresView)?;
    standing_of(state, membre_id, today).await
}

pub(crate) async fn standing_of(
    state: &ServerState,
    membre_id: i64,
    today: NaiveDate,
) -> AppResult<MemberStanding> {
    if !membre::exists(&state.pool, membre_id).await? {
        return Err(AppError::with_message(
            ErrorCode::MemberNotFound,
            format!("Member {membre_id} not found"),
        ));
    }
    let latest = cotisation::latest_payment(&state.pool, membre_id).await?;
    let up_to_date =
        reports::is_up_to_date(latest.as_ref(), today, state.config.up_to_date_window_days);
    Ok(MemberStanding {
        membre_id,
        up_to_date,
        last_payment: latest.as_ref().and_then(|l| l.date_paiement),
        last_status: latest.and_then(|l| l.statut_libelle),
    })
}

/// Printable dues report: period sections grouped by locality
pub async fn print_report(
    state: &ServerState,
    ctx: &RequestContext,
    filters: &CotisationFilters,
    today: NaiveDate,
) -> AppResult<PeriodReport<CotisationDetail>> {
    require_permission(&ctx.actor, Permission::CotisationsView)?;
    let report_filters = resolve_report_filters(
        &state.pool,
        ctx,
        filters.membre_id,
        filters.localite_id,
        filters.annee.as_deref(),
        filters.mois.as_deref(),
    )
    .await?;

    // Every candidate period lies in one year
    let query = CotisationQuery {
        membre_id: report_filters.membre_id,
        localite_id: report_filters.locality.as_ref().map(|l| l.id),
        annee: Some(report_filters.year.unwrap_or(today.year())),
        mois: report_filters.month.map(|m| m as i32),
    };
    let records = cotisation::list(&state.pool, &query).await?;
    tracing::debug!(records = records.len(), "Dues report data loaded");

    reports::build_report(
        ReportKind::Dues,
        records,
        &report_filters,
        today,
        ctx.locale,
        &state.config.association_name,
    )
}

pub async fn list_statuts(
    state: &ServerState,
    ctx: &RequestContext,
) -> AppResult<Vec<StatutCotisation>> {
    require_permission(&ctx.actor, Permission::CotisationsView)?;
    Ok(reference::find_statuts(&state.pool).await?)
}

pub async fn list_modes(state: &ServerState, ctx: &RequestContext) -> AppResult<Vec<ModePaiement>> {
    require_permission(&ctx.actor, Permission::CotisationsView)?;
    Ok(reference::find_modes(&state.pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin_ctx, seed_localite, seed_member, test_state, user_ctx};
    use rust_decimal::Decimal;

    fn input(membre_id: i64, annee: &str, mois: &str, montant: f64) -> CotisationInput {
        CotisationInput {
            membre_id,
            montant,
            annee: annee.into(),
            mois: mois.into(),
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn test_bulk_upsert_creates_then_updates() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let awa = seed_member(&state.pool, "Awa", None).await;
        let yao = seed_member(&state.pool, "Yao", None).await;

        let first = bulk_upsert(&state, &ctx, vec![input(awa, "2024", "03", 5000.0)])
            .await
            .unwrap();
        assert_eq!(first.summary, UpsertSummary { created: 1, updated: 0 });

        let second = bulk_upsert(
            &state,
            &ctx,
            vec![input(awa, "2024", "3", 7000.0), input(yao, "2024", "3", 2000.0)],
        )
        .await
        .unwrap();
        assert_eq!(second.summary, UpsertSummary { created: 1, updated: 1 });
        assert_eq!(
            second.message,
            "1 cotisation(s) créée(s) et 1 cotisation(s) mise(s) à jour avec succès."
        );

        let query = CotisationQuery {
            membre_id: Some(awa),
            ..Default::default()
        };
        let rows = cotisation::list(&state.pool, &query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cotisation.montant, 7000.0);
        assert_eq!(rows[0].cotisation.enregistre_par, Some(ctx.user_id()));
    }

    #[tokio::test]
    async fn test_bulk_upsert_is_all_or_nothing() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let awa = seed_member(&state.pool, "Awa", None).await;

        let err = bulk_upsert(
            &state,
            &ctx,
            vec![input(awa, "2024", "1", 1000.0), input(awa, "2024", "13", -5.0)],
        )
        .await
        .unwrap_err();

        let fields = err.field_errors().unwrap();
        assert!(fields.contains("cotisations.1.mois"));
        assert!(fields.contains("cotisations.1.montant"));
        assert!(!fields.contains("cotisations.0.mois"));

        let rows = cotisation::list(&state.pool, &CotisationQuery::default()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let (state, _dir) = test_state().await;
        let err = bulk_upsert(&state, &admin_ctx(&state).await, Vec::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BatchEmpty);
    }

    #[tokio::test]
    async fn test_single_create_refuses_duplicate_key() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let awa = seed_member(&state.pool, "Awa", None).await;

        create_cotisation(&state, &ctx, input(awa, "2025", "06", 3000.0))
            .await
            .unwrap();
        let err = create_cotisation(&state, &ctx, input(awa, "2025", "6", 3000.0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
    }

    #[tokio::test]
    async fn test_unknown_member_and_status_rejected() {
        let (state, _dir) = test_state().await;
        let mut bad = input(42, "2025", "1", 100.0);
        bad.statut_cotisation_id = Some(9999);
        let err = create_cotisation(&state, &admin_ctx(&state).await, bad).await.unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains("membre_id"));
        assert!(fields.contains("statut_cotisation_id"));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (state, _dir) = test_state().await;
        let err = delete_cotisation(&state, &admin_ctx(&state).await, 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CotisationNotFound);
    }

    #[tokio::test]
    async fn test_viewer_cannot_create() {
        let (state, _dir) = test_state().await;
        let ctx = user_ctx(&state, &["cotisations.view"]).await;
        let err = create_cotisation(&state, &ctx, input(1, "2025", "1", 1.0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_entry_sheet_filters_by_payment() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let awa = seed_member(&state.pool, "Awa", None).await;
        let yao = seed_member(&state.pool, "Yao", None).await;
        bulk_upsert(&state, &ctx, vec![input(awa, "2026", "10", 5000.0)])
            .await
            .unwrap();

        let unpaid = entry_sheet(&state, &ctx, None, None, PaymentFilter::Unpaid, None, today())
            .await
            .unwrap();
        assert_eq!((unpaid.annee, unpaid.mois), (2026, 10));
        let ids: Vec<i64> = unpaid.rows.iter().map(|r| r.membre_id).collect();
        assert_eq!(ids, [yao]);

        let all = entry_sheet(&state, &ctx, None, None, PaymentFilter::All, None, today())
            .await
            .unwrap();
        assert_eq!(all.rows.len(), 2);
        let paid_row = all.rows.iter().find(|r| r.membre_id == awa).unwrap();
        assert_eq!(paid_row.montant_existant, Some(5000.0));
    }

    #[tokio::test]
    async fn test_member_standing() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let awa = seed_member(&state.pool, "Awa", None).await;
        let paid = reference::find_statuts(&state.pool)
            .await
            .unwrap()
            .into_iter()
            .find(|s| s.libelle == "Payé")
            .unwrap();

        let standing = member_standing(&state, &ctx, awa, today()).await.unwrap();
        assert!(!standing.up_to_date);

        let mut entry = input(awa, "2026", "10", 5000.0);
        entry.statut_cotisation_id = Some(paid.id);
        entry.date_paiement = NaiveDate::from_ymd_opt(2026, 10, 1);
        create_cotisation(&state, &ctx, entry).await.unwrap();

        let standing = member_standing(&state, &ctx, awa, today()).await.unwrap();
        assert!(standing.up_to_date);
        assert_eq!(standing.last_status.as_deref(), Some("Payé"));
    }

    #[tokio::test]
    async fn test_print_report_groups_by_locality() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let daloa = seed_localite(&state.pool, "Daloa").await;
        let awa = seed_member(&state.pool, "Awa", Some(daloa)).await;
        let yao = seed_member(&state.pool, "Yao", None).await;
        bulk_upsert(
            &state,
            &ctx,
            vec![
                input(awa, "2025", "2", 1000.0),
                input(yao, "2025", "2", 500.5),
                input(awa, "2025", "5", 250.0),
            ],
        )
        .await
        .unwrap();

        let filters = CotisationFilters {
            annee: Some("2025".into()),
            ..Default::default()
        };
        let report = print_report(&state, &ctx, &filters, today()).await.unwrap();
        assert_eq!(report.buckets.len(), 2);
        assert_eq!(report.buckets[0].month, 2);
        assert_eq!(report.buckets[0].groups.len(), 2);
        assert_eq!(report.buckets[0].total, Decimal::new(150050, 2));
        assert_eq!(report.buckets[1].month, 5);
    }

    #[tokio::test]
    async fn test_print_report_unknown_locality() {
        let (state, _dir) = test_state().await;
        let filters = CotisationFilters {
            localite_id: Some(404),
            ..Default::default()
        };
        let err = print_report(&state, &admin_ctx(&state).await, &filters, today())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::LocaliteNotFound);
    }
}
