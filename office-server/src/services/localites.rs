//! Localities

use crate::auth::{Permission, require_permission};
use crate::core::ServerState;
use crate::db::repository::localite;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::error::{ErrorCode, FieldErrors};
use shared::models::{Localite, LocaliteCreate, LocaliteUpdate};

use super::RequestContext;

fn validate_libelle(ctx: &RequestContext, libelle: &str) -> AppResult<String> {
    let libelle = libelle.trim().to_string();
    let mut errors = FieldErrors::new();
    validate_required_text(&mut errors, ctx.locale, "libelle", &libelle, MAX_NAME_LEN);
    errors.into_result()?;
    Ok(libelle)
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::LocaliteNotFound, format!("Locality {id} not found"))
}

/// Localities are reference data: readable by anyone who can see members
pub async fn list_localites(state: &ServerState, ctx: &RequestContext) -> AppResult<Vec<Localite>> {
    require_permission(&ctx.actor, Permission::MembresView)?;
    Ok(localite::find_all(&state.pool).await?)
}

pub async fn create_localite(
    state: &ServerState,
    ctx: &RequestContext,
    payload: LocaliteCreate,
) -> AppResult<Localite> {
    require_permission(&ctx.actor, Permission::ParametresManage)?;
    let libelle = validate_libelle(ctx, &payload.libelle)?;
    let created = localite::create(&state.pool, &libelle).await?;
    tracing::info!(user_id = ctx.user_id(), localite_id = created.id, "Locality created");
    Ok(created)
}

pub async fn update_localite(
    state: &ServerState,
    ctx: &RequestContext,
    id: i64,
    payload: LocaliteUpdate,
) -> AppResult<Localite> {
    require_permission(&ctx.actor, Permission::ParametresManage)?;
    let existing = localite::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let Some(libelle) = payload.libelle else {
        return Ok(existing);
    };
    let libelle = validate_libelle(ctx, &libelle)?;
    Ok(localite::update(&state.pool, id, &libelle).await?)
}

/// Delete a locality; its members move to the "no locality" bucket
pub async fn delete_localite(state: &ServerState, ctx: &RequestContext, id: i64) -> AppResult<()> {
    require_permission(&ctx.actor, Permission::ParametresManage)?;
    if !localite::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = ctx.user_id(), localite_id = id, "Locality deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin_ctx, test_state};

    #[tokio::test]
    async fn test_crud() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;

        let created = create_localite(&state, &ctx, LocaliteCreate { libelle: " Abidjan ".into() })
            .await
            .unwrap();
        assert_eq!(created.libelle, "Abidjan");

        let renamed = update_localite(
            &state,
            &ctx,
            created.id,
            LocaliteUpdate {
                libelle: Some("Bouaké".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.libelle, "Bouaké");

        delete_localite(&state, &ctx, created.id).await.unwrap();
        let err = delete_localite(&state, &ctx, created.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LocaliteNotFound);
    }

    #[tokio::test]
    async fn test_blank_label_rejected() {
        let (state, _dir) = test_state().await;
        let err = create_localite(&state, &admin_ctx(&state).await, LocaliteCreate { libelle: "  ".into() })
            .await
            .unwrap_err();
        assert!(err.field_errors().unwrap().contains("libelle"));
    }
}
