//! Authorization guards
//!
//! The resolver answers with booleans; guards turn a `false` into an
//! [`AppError`] and record a security event.

use super::permissions::Permission;
use super::resolver::Actor;
use crate::security_log;
use shared::error::{AppError, AppResult, ErrorCode};

fn ensure_not_blocked(actor: &Actor) -> AppResult<()> {
    if actor.blocked {
        security_log!("WARN", "account_locked", user_id = actor.user_id);
        return Err(AppError::new(ErrorCode::AccountLocked));
    }
    Ok(())
}

/// Require a permission (administrators always pass)
pub fn require_permission(actor: &Actor, permission: Permission) -> AppResult<()> {
    ensure_not_blocked(actor)?;
    if actor.can(permission) {
        return Ok(());
    }
    security_log!(
        "WARN",
        "permission_denied",
        user_id = actor.user_id,
        permission = permission.key()
    );
    Err(
        AppError::with_message(ErrorCode::PermissionDenied, format!("Permission denied: {permission}"))
            .with_detail("permission", permission.key()),
    )
}

/// Require administrator rights
pub fn require_admin(actor: &Actor) -> AppResult<()> {
    ensure_not_blocked(actor)?;
    if actor.is_admin() {
        return Ok(());
    }
    security_log!("WARN", "admin_required", user_id = actor.user_id);
    Err(AppError::new(ErrorCode::AdminRequired))
}

/// Require a role slug (role-gated areas)
pub fn require_role(actor: &Actor, slug: &str) -> AppResult<()> {
    ensure_not_blocked(actor)?;
    if actor.has_role(slug) || actor.is_admin() {
        return Ok(());
    }
    security_log!("WARN", "role_required", user_id = actor.user_id, role = slug);
    Err(AppError::with_message(ErrorCode::RoleRequired, format!("Role required: {slug}"))
        .with_detail("role", slug))
}
