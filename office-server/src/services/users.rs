//! Users and role assignment

use crate::auth::{Actor, Permission, require_admin, require_permission};
use crate::core::ServerState;
use crate::db::repository::{role, user};
use crate::utils::validation::{MAX_EMAIL_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::error::{ErrorCode, FieldErrors};
use shared::models::{ADMIN_ROLE_SLUG, AuthContext, User, UserCreate};
use sqlx::SqlitePool;

use super::RequestContext;

fn user_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found"))
}

async fn find_user(pool: &SqlitePool, id: i64) -> AppResult<User> {
    user::find_by_id(pool, id).await?.ok_or_else(|| user_not_found(id))
}

/// Materialize an actor with both role representations
pub async fn load_actor(pool: &SqlitePool, user_id: i64) -> AppResult<Actor> {
    let account = find_user(pool, user_id).await?;
    let roles = role::find_by_user(pool, user_id).await?;
    let legacy_role = match account.role_id {
        Some(role_id) => role::find_by_id(pool, role_id).await?,
        None => None,
    };
    Ok(Actor::new(user_id, roles, legacy_role).with_blocked(account.est_bloque))
}

/// Per-request authorization summary for the presentation layer
pub async fn auth_context(pool: &SqlitePool, user_id: i64) -> AppResult<AuthContext> {
    Ok(load_actor(pool, user_id).await?.auth_context())
}

pub async fn list_users(state: &ServerState, ctx: &RequestContext) -> AppResult<Vec<User>> {
    require_permission(&ctx.actor, Permission::UtilisateursView)?;
    Ok(user::find_all(&state.pool).await?)
}

pub async fn create_user(
    state: &ServerState,
    ctx: &RequestContext,
    payload: UserCreate,
) -> AppResult<User> {
    require_permission(&ctx.actor, Permission::UtilisateursCreate)?;

    let locale = ctx.locale;
    let email = payload.email.trim().to_lowercase();
    let mut errors = FieldErrors::new();
    validate_required_text(&mut errors, locale, "email", &email, MAX_EMAIL_LEN);
    if !errors.contains("email") {
        if !email.contains('@') {
            errors.add("email", locale.not_exists("email"));
        } else if user::find_by_email(&state.pool, &email).await?.is_some() {
            errors.add("email", locale.already_taken("email"));
        }
    }
    if let Some(role_id) = payload.role_id
        && role::find_by_id(&state.pool, role_id).await?.is_none()
    {
        errors.add("role_id", locale.not_exists("role_id"));
    }
    errors.into_result()?;

    let created = user::create(
        &state.pool,
        &UserCreate {
            email,
            role_id: payload.role_id,
        },
    )
    .await?;
    tracing::info!(user_id = ctx.user_id(), created_id = created.id, "User created");
    Ok(created)
}

/// Replace a user's many-to-many role set
pub async fn assign_roles(
    state: &ServerState,
    ctx: &RequestContext,
    user_id: i64,
    role_ids: &[i64],
) -> AppResult<Vec<shared::models::Role>> {
    require_admin(&ctx.actor)?;
    find_user(&state.pool, user_id).await?;

    let mut unique: Vec<i64> = Vec::with_capacity(role_ids.len());
    for &id in role_ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }

    let missing = role::missing_ids(&state.pool, &unique).await?;
    if !missing.is_empty() {
        let mut errors = FieldErrors::new();
        for (index, id) in role_ids.iter().enumerate() {
            if missing.contains(id) {
                errors.add(format!("role_ids.{index}"), ctx.locale.not_exists("role_ids"));
            }
        }
        return Err(AppError::invalid_fields(&errors));
    }

    user::set_roles(&state.pool, user_id, &unique).await?;
    tracing::info!(
        user_id = ctx.user_id(),
        target_user = user_id,
        roles = unique.len(),
        "Roles assigned"
    );
    Ok(role::find_by_user(&state.pool, user_id).await?)
}

/// Set or clear the legacy single-role reference
pub async fn assign_legacy_role(
    state: &ServerState,
    ctx: &RequestContext,
    user_id: i64,
    role_id: Option<i64>,
) -> AppResult<User> {
    require_admin(&ctx.actor)?;
    find_user(&state.pool, user_id).await?;

    if let Some(id) = role_id
        && role::find_by_id(&state.pool, id).await?.is_none()
    {
        let mut errors = FieldErrors::new();
        errors.add("role_id", ctx.locale.not_exists("role_id"));
        return Err(AppError::invalid_fields(&errors));
    }

    let updated = user::set_legacy_role(&state.pool, user_id, role_id).await?;
    tracing::info!(
        user_id = ctx.user_id(),
        target_user = user_id,
        role_id = ?role_id,
        "Legacy role assigned"
    );
    Ok(updated)
}

/// Flip the blocked flag
pub async fn toggle_block(state: &ServerState, ctx: &RequestContext, user_id: i64) -> AppResult<User> {
    require_admin(&ctx.actor)?;
    let current = find_user(&state.pool, user_id).await?;
    let updated = user::set_blocked(&state.pool, user_id, !current.est_bloque).await?;
    crate::security_log!(
        "INFO",
        "account_block_toggled",
        user_id = ctx.user_id(),
        target_user = user_id,
        blocked = updated.est_bloque
    );
    Ok(updated)
}

/// Ensure an account exists for `email` and holds the administrator role
pub async fn ensure_admin_user(pool: &SqlitePool, email: &str) -> AppResult<User> {
    let email = email.trim().to_lowercase();
    let account = match user::find_by_email(pool, &email).await? {
        Some(existing) => existing,
        None => {
            let created = user::create(
                pool,
                &UserCreate {
                    email: email.clone(),
                    role_id: None,
                },
            )
            .await?;
            tracing::info!(user_id = created.id, "Bootstrap administrator created");
            created
        }
    };

    let admin = role::find_by_slug(pool, ADMIN_ROLE_SLUG)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::RoleNotFound, "Administrator role missing"))?;
    let mut role_ids: Vec<i64> = role::find_by_user(pool, account.id)
        .await?
        .iter()
        .map(|r| r.id)
        .collect();
    if !role_ids.contains(&admin.id) {
        role_ids.push(admin.id);
        user::set_roles(pool, account.id, &role_ids).await?;
    }
    Ok(account)
}
