//! Members

use crate::auth::{Permission, require_permission};
use crate::core::ServerState;
use crate::db::repository::cotisation::{self, CotisationQuery};
use crate::db::repository::depense::{self, DepenseQuery};
use crate::db::repository::{attachment, localite, membre};
use crate::reports::{MemberRoster, build_roster};
use crate::storage::{PHOTOS_DIR, delete_all};
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_PERSON_NAME_LEN, MAX_PHONE_LEN, MAX_URL_LEN, normalize_optional,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, amount_overflow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::{ErrorCode, FieldErrors};
use shared::i18n::Locale;
use shared::models::{
    AttachmentUpload, CotisationDetail, DepenseDetail, MEMBRE_ACTIF, MEMBRE_INACTIF,
    MemberStanding, MembreCreate, MembreFilters, MembreSummary, MembreUpdate, MembreWithLocalite,
};
use shared::util::sum_money;
use sqlx::SqlitePool;

use super::{RequestContext, check_upload, dues};

/// Accepted photo extensions
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Dues and expenses shown on a member profile
const RECENT_LIMIT: usize = 5;

/// Member profile
#[derive(Debug, Clone, Serialize)]
pub struct MemberProfile {
    #[serde(flatten)]
    pub membre: MembreWithLocalite,
    pub recent_dues: Vec<CotisationDetail>,
    pub recent_expenses: Vec<DepenseDetail>,
    pub total_cotisations: Decimal,
    pub total_depenses: Decimal,
    pub standing: MemberStanding,
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::MemberNotFound, format!("Member {id} not found"))
}

async fn find_member(pool: &SqlitePool, id: i64) -> AppResult<MembreWithLocalite> {
    membre::find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

async fn check_localite(
    pool: &SqlitePool,
    locale: Locale,
    localite_id: Option<i64>,
    errors: &mut FieldErrors,
) -> AppResult<()> {
    if let Some(id) = localite_id
        && localite::find_by_id(pool, id).await?.is_none()
    {
        errors.add("localite_id", locale.not_exists("localite_id"));
    }
    Ok(())
}

fn check_statut(locale: Locale, statut: Option<i32>, errors: &mut FieldErrors) {
    if let Some(statut) = statut
        && statut != MEMBRE_ACTIF
        && statut != MEMBRE_INACTIF
    {
        errors.add("statut", locale.not_exists("statut"));
    }
}

fn is_stored_photo_path(path: &str) -> bool {
    path.trim_start_matches('/').starts_with(&format!("{PHOTOS_DIR}/"))
}

/// Submitted photo URLs may keep the member's current stored photo but
/// never point at another stored one; only `set_member_photo` writes those
fn check_optional_fields(
    locale: Locale,
    data: (&Option<String>, &Option<String>, &Option<String>),
    current_photo: Option<&str>,
    errors: &mut FieldErrors,
) {
    let (telephone, adresse, photo_url) = data;
    validate_optional_text(errors, locale, "telephone", telephone, MAX_PHONE_LEN);
    validate_optional_text(errors, locale, "adresse", adresse, MAX_NOTE_LEN);
    validate_optional_text(errors, locale, "photo_url", photo_url, MAX_URL_LEN);
    if let Some(url) = photo_url.as_deref()
        && is_stored_photo_path(url)
        && Some(url) != current_photo
    {
        errors.add("photo_url", locale.invalid_format("photo_url"));
    }
}

pub async fn list_membres(
    state: &ServerState,
    ctx: &RequestContext,
    filters: &MembreFilters,
) -> AppResult<Vec<MembreSummary>> {
    require_permission(&ctx.actor, Permission::MembresView)?;
    Ok(membre::list(&state.pool, filters).await?)
}

/// Profile: identity, recent activity, lifetime totals and standing
pub async fn get_membre(
    state: &ServerState,
    ctx: &RequestContext,
    id: i64,
    today: NaiveDate,
) -> AppResult<MemberProfile> {
    require_permission(&ctx.actor, Permission::MembresView)?;
    let found = find_member(&state.pool, id).await?;

    let dues = cotisation::list(
        &state.pool,
        &CotisationQuery {
            membre_id: Some(id),
            ..Default::default()
        },
    )
    .await?;
    let expenses = depense::list(
        &state.pool,
        &DepenseQuery {
            membre_id: Some(id),
            ..Default::default()
        },
    )
    .await?;

    let total_cotisations =
        sum_money(dues.iter().map(|c| c.cotisation.montant)).ok_or_else(amount_overflow)?;
    let total_depenses = sum_money(expenses.iter().map(|d| d.depense.effective_amount()))
        .ok_or_else(amount_overflow)?;
    let standing = dues::standing_of(state, id, today).await?;

    Ok(MemberProfile {
        membre: found,
        recent_dues: dues.into_iter().take(RECENT_LIMIT).collect(),
        recent_expenses: expenses.into_iter().take(RECENT_LIMIT).collect(),
        total_cotisations,
        total_depenses,
        standing,
    })
}

pub async fn create_membre(
    state: &ServerState,
    ctx: &RequestContext,
    payload: MembreCreate,
) -> AppResult<MembreWithLocalite> {
    require_permission(&ctx.actor, Permission::MembresCreate)?;
    let locale = ctx.locale;
    let data = MembreCreate {
        nom: payload.nom.trim().to_string(),
        prenom: payload.prenom.trim().to_string(),
        telephone: normalize_optional(payload.telephone),
        adresse: normalize_optional(payload.adresse),
        photo_url: normalize_optional(payload.photo_url),
        ..payload
    };

    let mut errors = FieldErrors::new();
    validate_required_text(&mut errors, locale, "nom", &data.nom, MAX_PERSON_NAME_LEN);
    validate_required_text(&mut errors, locale, "prenom", &data.prenom, MAX_PERSON_NAME_LEN);
    let fields = (&data.telephone, &data.adresse, &data.photo_url);
    check_optional_fields(locale, fields, None, &mut errors);
    check_localite(&state.pool, locale, data.localite_id, &mut errors).await?;
    check_statut(locale, data.statut, &mut errors);
    errors.into_result()?;

    let created = membre::create(&state.pool, &data).await?;
    tracing::info!(user_id = ctx.user_id(), membre_id = created.membre.id, "Member created");
    Ok(created)
}

/// Partial update: only provided fields change
pub async fn update_membre(
    state: &ServerState,
    ctx: &RequestContext,
    id: i64,
    payload: MembreUpdate,
) -> AppResult<MembreWithLocalite> {
    require_permission(&ctx.actor, Permission::MembresEdit)?;
    let existing = find_member(&state.pool, id).await?;
    let locale = ctx.locale;
    let data = MembreUpdate {
        nom: payload.nom.map(|v| v.trim().to_string()),
        prenom: payload.prenom.map(|v| v.trim().to_string()),
        telephone: normalize_optional(payload.telephone),
        adresse: normalize_optional(payload.adresse),
        photo_url: normalize_optional(payload.photo_url),
        ..payload
    };

    let mut errors = FieldErrors::new();
    if let Some(nom) = &data.nom {
        validate_required_text(&mut errors, locale, "nom", nom, MAX_PERSON_NAME_LEN);
    }
    if let Some(prenom) = &data.prenom {
        validate_required_text(&mut errors, locale, "prenom", prenom, MAX_PERSON_NAME_LEN);
    }
    let fields = (&data.telephone, &data.adresse, &data.photo_url);
    check_optional_fields(locale, fields, existing.membre.photo_url.as_deref(), &mut errors);
    check_localite(&state.pool, locale, data.localite_id, &mut errors).await?;
    check_statut(locale, data.statut, &mut errors);
    errors.into_result()?;

    let updated = membre::update(&state.pool, id, &data).await?;
    tracing::info!(user_id = ctx.user_id(), membre_id = id, "Member updated");
    Ok(updated)
}

/// Replace the member photo; the previous stored photo is removed
pub async fn set_member_photo(
    state: &ServerState,
    ctx: &RequestContext,
    id: i64,
    upload: AttachmentUpload,
) -> AppResult<MembreWithLocalite> {
    require_permission(&ctx.actor, Permission::MembresEdit)?;
    let existing = find_member(&state.pool, id).await?;
    check_upload(ctx.locale, "photo", &upload, PHOTO_EXTENSIONS, state.config.max_upload_bytes)?;

    let blob = state
        .blobs
        .store(PHOTOS_DIR, &upload.original_name, upload.mime.as_deref(), &upload.bytes)
        .await?;
    membre::set_photo(&state.pool, id, Some(&blob.path)).await?;

    if let Some(previous) = stored_photo(&existing) {
        delete_all(state.blobs.as_ref(), &[previous]).await;
    }
    tracing::info!(user_id = ctx.user_id(), membre_id = id, path = %blob.path, "Member photo updated");
    find_member(&state.pool, id).await
}

/// Photo path when it points into the blob store
fn stored_photo(found: &MembreWithLocalite) -> Option<String> {
    found
        .membre
        .photo_url
        .as_ref()
        .filter(|p| is_stored_photo_path(p))
        .cloned()
}

/// Delete a member with their dues, expenses, attachments and photo
pub async fn delete_membre(state: &ServerState, ctx: &RequestContext, id: i64) -> AppResult<()> {
    require_permission(&ctx.actor, Permission::MembresDelete)?;
    let found = find_member(&state.pool, id).await?;

    let mut paths = attachment::paths_for_member(&state.pool, id).await?;
    paths.extend(stored_photo(&found));

    if !membre::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    delete_all(state.blobs.as_ref(), &paths).await;

    tracing::info!(user_id = ctx.user_id(), membre_id = id, blobs = paths.len(), "Member deleted");
    Ok(())
}

/// Printable roster grouped by locality
pub async fn print_roster(
    state: &ServerState,
    ctx: &RequestContext,
    filters: &MembreFilters,
) -> AppResult<MemberRoster> {
    require_permission(&ctx.actor, Permission::MembresView)?;
    let members = membre::roster(&state.pool, filters).await?;
    Ok(build_roster(
        members,
        filters.localite_id.is_some(),
        normalize_optional(filters.search.clone()),
        ctx.locale,
        &state.config.association_name,
    ))
}
