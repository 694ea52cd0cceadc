//! Role management (administrators only)

use crate::auth::{require_admin, validate_permission_keys};
use crate::core::ServerState;
use crate::db::repository::role::{self, RoleRecord};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, normalize_optional, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::error::{ErrorCode, FieldErrors};
use shared::i18n::Locale;
use shared::models::{ADMIN_PERMISSION, ADMIN_ROLE_SLUG, Role, RoleCreate, RoleUpdate, RoleWithUserCount};
use sqlx::SqlitePool;

use super::RequestContext;

/// URL-safe key from a role name
///
/// Lowercase ASCII; French accents are transliterated and every run of other
/// characters becomes a single `-`.
///
/// ```
/// use office_server::services::roles::slugify;
/// assert_eq!(slugify("Trésorier Général"), "tresorier-general");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let mapped: &str = match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
            'ç' => "c",
            'è' | 'é' | 'ê' | 'ë' => "e",
            'ì' | 'í' | 'î' | 'ï' => "i",
            'ñ' => "n",
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => "o",
            'ù' | 'ú' | 'û' | 'ü' => "u",
            'ý' | 'ÿ' => "y",
            'œ' => "oe",
            'æ' => "ae",
            'ß' => "ss",
            c if c.is_ascii_alphanumeric() => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
                continue;
            }
            _ => {
                pending_dash = true;
                continue;
            }
        };
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.push_str(mapped);
    }
    slug
}

/// Validate a role form into a record; uniqueness is checked against every
/// role except `except_id`
async fn validate_role(
    pool: &SqlitePool,
    locale: Locale,
    nom: &str,
    description: Option<String>,
    permissions: &[String],
    actif: Option<bool>,
    except_id: Option<i64>,
) -> AppResult<RoleRecord> {
    let mut errors = FieldErrors::new();
    let nom = nom.trim().to_string();
    let description = normalize_optional(description);

    validate_required_text(&mut errors, locale, "nom", &nom, MAX_NAME_LEN);
    validate_optional_text(&mut errors, locale, "description", &description, MAX_NOTE_LEN);

    let permissions = match validate_permission_keys(permissions, locale) {
        Ok(keys) => keys,
        Err(e) => {
            errors.merge(e);
            Vec::new()
        }
    };

    let slug = slugify(&nom);
    let mut name_conflict = false;
    if !errors.contains("nom") {
        if slug.is_empty() {
            errors.add("nom", locale.invalid_format("nom"));
        } else {
            let slug_owner = role::find_by_slug(pool, &slug).await?;
            let slug_taken = slug_owner.is_some_and(|r| Some(r.id) != except_id);
            if slug_taken || role::name_taken(pool, &nom, except_id).await? {
                errors.add("nom", locale.already_taken("nom"));
                name_conflict = true;
            }
        }
    }

    if !errors.is_empty() {
        if name_conflict && errors.len() == 1 {
            return Err(AppError::with_message(
                ErrorCode::RoleNameExists,
                locale.already_taken("nom"),
            )
            .with_field_errors(&errors));
        }
        if errors.iter().all(|(field, _)| field.starts_with("permissions.")) {
            let message = errors.first_message().unwrap_or_default();
            return Err(AppError::with_message(ErrorCode::UnknownPermission, message)
                .with_field_errors(&errors));
        }
        return Err(AppError::invalid_fields(&errors));
    }

    Ok(RoleRecord {
        nom,
        slug,
        description,
        permissions,
        actif: actif.unwrap_or(true),
    })
}

pub async fn list_roles(state: &ServerState, ctx: &RequestContext) -> AppResult<Vec<RoleWithUserCount>> {
    require_admin(&ctx.actor)?;
    Ok(role::find_all_with_user_count(&state.pool).await?)
}

/// Active roles offered in assignment forms
pub async fn list_active_roles(state: &ServerState, ctx: &RequestContext) -> AppResult<Vec<Role>> {
    require_admin(&ctx.actor)?;
    let roles = role::find_all(&state.pool).await?;
    Ok(roles.into_iter().filter(|r| r.actif).collect())
}

pub async fn get_role(state: &ServerState, ctx: &RequestContext, id: i64) -> AppResult<Role> {
    require_admin(&ctx.actor)?;
    find_role(&state.pool, id).await
}

async fn find_role(pool: &SqlitePool, id: i64) -> AppResult<Role> {
    role::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::RoleNotFound, format!("Role {id} not found")))
}

pub async fn create_role(
    state: &ServerState,
    ctx: &RequestContext,
    payload: RoleCreate,
) -> AppResult<Role> {
    require_admin(&ctx.actor)?;

    let record = validate_role(
        &state.pool,
        ctx.locale,
        &payload.nom,
        payload.description,
        &payload.permissions,
        payload.actif,
        None,
    )
    .await?;

    let created = role::create(&state.pool, &record).await?;
    tracing::info!(
        user_id = ctx.user_id(),
        role_id = created.id,
        slug = %created.slug,
        "Role created"
    );
    Ok(created)
}

/// Replace every field of a role; the slug follows the new name except for
/// the reserved administrator role, which keeps its slug
pub async fn update_role(
    state: &ServerState,
    ctx: &RequestContext,
    id: i64,
    payload: RoleUpdate,
) -> AppResult<Role> {
    require_admin(&ctx.actor)?;
    let existing = find_role(&state.pool, id).await?;

    let mut record = validate_role(
        &state.pool,
        ctx.locale,
        &payload.nom,
        payload.description,
        &payload.permissions,
        payload.actif,
        Some(id),
    )
    .await?;
    if existing.is_admin_slug() {
        record.slug = ADMIN_ROLE_SLUG.to_string();
    }

    let updated = role::update(&state.pool, id, &record).await?;
    tracing::info!(user_id = ctx.user_id(), role_id = id, "Role updated");
    Ok(updated)
}

/// Delete a role unless it is assigned to a user or reserved
pub async fn delete_role(state: &ServerState, ctx: &RequestContext, id: i64) -> AppResult<()> {
    require_admin(&ctx.actor)?;
    let existing = find_role(&state.pool, id).await?;

    if role::count_users(&state.pool, id).await? > 0 {
        return Err(AppError::with_message(
            ErrorCode::RoleInUse,
            ctx.locale.role_in_use(),
        ));
    }
    if existing.is_admin_slug() {
        return Err(AppError::with_message(
            ErrorCode::RoleIsReserved,
            ctx.locale.role_reserved(),
        ));
    }

    role::delete(&state.pool, id).await?;
    tracing::info!(user_id = ctx.user_id(), role_id = id, slug = %existing.slug, "Role deleted");
    Ok(())
}

/// Ensure the reserved administrator role exists
pub async fn ensure_admin_role(pool: &SqlitePool) -> AppResult<Role> {
    if let Some(existing) = role::find_by_slug(pool, ADMIN_ROLE_SLUG).await? {
        return Ok(existing);
    }
    let record = RoleRecord {
        nom: "Administrateur".to_string(),
        slug: ADMIN_ROLE_SLUG.to_string(),
        description: Some("Accès complet à l'application".to_string()),
        permissions: vec![ADMIN_PERMISSION.to_string()],
        actif: true,
    };
    let created = role::create(pool, &record).await?;
    tracing::info!(role_id = created.id, "Administrator role seeded");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin_ctx, test_state, user_ctx};

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Administrateur"), "administrateur");
        assert_eq!(slugify("Trésorier Général"), "tresorier-general");
        assert_eq!(slugify("  Chargé   de  l'Accueil!! "), "charge-de-l-accueil");
        assert_eq!(slugify("Cœur"), "coeur");
        assert_eq!(slugify("---"), "");
    }

    #[tokio::test]
    async fn test_create_role_validates_and_slugs() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;

        let created = create_role(
            &state,
            &ctx,
            RoleCreate {
                nom: "Trésorier".into(),
                description: Some("  ".into()),
                permissions: vec!["cotisations.view".into(), "cotisations.view".into()],
                actif: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(created.slug, "tresorier");
        assert_eq!(created.permissions, vec!["cotisations.view"]);
        assert!(created.actif);
        assert!(created.description.is_none());
    }

    #[tokio::test]
    async fn test_unknown_permission_rejected() {
        let (state, _dir) = test_state().await;
        let err = create_role(
            &state,
            &admin_ctx(&state).await,
            RoleCreate {
                nom: "Lecteur".into(),
                permissions: vec!["membres.view".into(), "membres.fly".into()],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::UnknownPermission);
        let fields = err.field_errors().unwrap();
        assert!(fields.contains("permissions.1"));
        assert!(!fields.contains("permissions.0"));

        // Mixed with another field error it stays a plain validation failure
        let err = create_role(
            &state,
            &admin_ctx(&state).await,
            RoleCreate {
                nom: " ".into(),
                permissions: vec!["membres.fly".into()],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_name_without_letters_is_invalid_format() {
        let (state, _dir) = test_state().await;
        let err = create_role(
            &state,
            &admin_ctx(&state).await,
            RoleCreate {
                nom: "---".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().get("nom").unwrap(),
            ["Le format du champ nom est invalide."]
        );
    }

    #[tokio::test]
    async fn test_active_roles_for_assignment() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        for (nom, actif) in [("Trésorier", Some(true)), ("Ancien Bureau", Some(false))] {
            create_role(
                &state,
                &ctx,
                RoleCreate {
                    nom: nom.into(),
                    actif,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        let active = list_active_roles(&state, &ctx).await.unwrap();
        let slugs: Vec<&str> = active.iter().map(|r| r.slug.as_str()).collect();
        assert!(slugs.contains(&"tresorier"));
        assert!(slugs.contains(&ADMIN_ROLE_SLUG));
        assert!(!slugs.contains(&"ancien-bureau"));

        let err = list_active_roles(&state, &user_ctx(&state, &["roles.view"]).await)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AdminRequired);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let payload = RoleCreate {
            nom: "Secrétaire".into(),
            ..Default::default()
        };
        create_role(&state, &ctx, payload.clone()).await.unwrap();

        let err = create_role(&state, &ctx, payload).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleNameExists);
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let (state, _dir) = test_state().await;
        let ctx = admin_ctx(&state).await;
        let created = create_role(
            &state,
            &ctx,
            RoleCreate {
                nom: "Lecteur".into(),
                permissions: vec!["membres.view".into()],
                actif: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = update_role(
            &state,
            &ctx,
            created.id,
            RoleUpdate {
                nom: "Lecteur Élargi".into(),
                description: None,
                permissions: vec!["depenses.view".into()],
                actif: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.slug, "lecteur-elargi");
        assert_eq!(updated.permissions, vec!["depenses.view"]);
        assert!(updated.actif);
    }

    #[tokio::test]
    async fn test_admin_role_cannot_be_deleted() {
        let (state, _dir) = test_state().await;
        let admin = role::find_by_slug(&state.pool, ADMIN_ROLE_SLUG)
            .await
            .unwrap()
            .unwrap();

        // Administrator through the permission, so the reserved role stays unassigned
        let ctx = user_ctx(&state, &["admin"]).await;
        assert!(ctx.actor.is_admin());

        let err = delete_role(&state, &ctx, admin.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleIsReserved);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_manage_roles() {
        let (state, _dir) = test_state().await;
        let err = list_roles(&state, &user_ctx(&state, &["roles.view"]).await).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AdminRequired);
    }
}
