//! Actor authorization resolver
//!
//! Pure functions of an actor's materialized role state, re-run on every
//! check. Two role representations are consulted: the many-to-many
//! assignments and the legacy single-role reference.
//!
//! # Rules
//!
//! 1. A role with slug `admin` makes the actor an administrator, active or not.
//! 2. An *active* role listing the `admin` permission does too.
//! 3. Administrators hold every permission, including unknown keys.
//! 4. Otherwise a permission is held when an active assigned role lists it,
//!    then when the active legacy role lists it.
//! 5. The legacy role follows rules 1 and 2 exactly like assigned roles.
//! 6. Blocked accounts hold nothing.

use super::permissions::{Permission, UI_PERMISSIONS};
use shared::models::{ADMIN_PERMISSION, AuthContext, Role};
use std::collections::{BTreeMap, BTreeSet};

/// Authenticated user with role assignments loaded
#[derive(Debug, Clone, Default)]
pub struct Actor {
    pub user_id: i64,
    /// Many-to-many assignments
    pub roles: Vec<Role>,
    /// Legacy single-role reference
    pub legacy_role: Option<Role>,
    pub blocked: bool,
}

fn grants_admin(role: &Role) -> bool {
    role.is_admin_slug() || (role.actif && role.lists(ADMIN_PERMISSION))
}

fn grants(role: &Role, key: &str) -> bool {
    role.actif && role.lists(key)
}

impl Actor {
    pub fn new(user_id: i64, roles: Vec<Role>, legacy_role: Option<Role>) -> Self {
        Self {
            user_id,
            roles,
            legacy_role,
            blocked: false,
        }
    }

    pub fn with_blocked(mut self, blocked: bool) -> Self {
        self.blocked = blocked;
        self
    }

    /// Administrator check
    pub fn is_admin(&self) -> bool {
        if self.blocked {
            return false;
        }
        self.roles.iter().any(grants_admin) || self.legacy_role.as_ref().is_some_and(grants_admin)
    }

    /// Permission check by key; unknown keys never match for non-admins
    pub fn has_permission(&self, key: &str) -> bool {
        if self.blocked || key.is_empty() {
            return false;
        }
        if self.is_admin() {
            return true;
        }
        if self.roles.iter().any(|r| grants(r, key)) {
            return true;
        }
        self.legacy_role.as_ref().is_some_and(|r| grants(r, key))
    }

    /// Typed permission check
    pub fn can(&self, permission: Permission) -> bool {
        self.has_permission(permission.key())
    }

    /// Role slug check over both representations, active flag ignored
    pub fn has_role(&self, slug: &str) -> bool {
        self.roles.iter().any(|r| r.slug == slug)
            || self.legacy_role.as_ref().is_some_and(|r| r.slug == slug)
    }

    /// Effective catalogue keys held by the actor
    pub fn permissions(&self) -> BTreeSet<&'static str> {
        Permission::ALL
            .iter()
            .filter(|p| self.can(**p))
            .map(|p| p.key())
            .collect()
    }

    /// Summary for the presentation layer: admin flag plus the UI keys
    pub fn auth_context(&self) -> AuthContext {
        let permissions: BTreeMap<String, bool> = UI_PERMISSIONS
            .iter()
            .map(|p| (p.key().to_string(), self.can(*p)))
            .collect();
        AuthContext {
            is_admin: self.is_admin(),
            permissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: i64, slug: &str, permissions: &[&str], actif: bool) -> Role {
        Role {
            id,
            nom: slug.to_string(),
            slug: slug.to_string(),
            description: None,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            actif,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_no_roles_means_nothing() {
        let actor = Actor::new(1, vec![], None);
        assert!(!actor.is_admin());
        for p in Permission::ALL {
            assert!(!actor.can(*p));
        }
        assert!(!actor.has_permission("anything.at.all"));
        assert!(actor.permissions().is_empty());
    }

    #[test]
    fn test_admin_slug_grants_everything() {
        let actor = Actor::new(1, vec![role(1, "admin", &[], true)], None);
        assert!(actor.is_admin());
        assert!(actor.has_permission("cotisations.view"));
        assert!(actor.has_permission("not.in.catalogue"));
        assert_eq!(actor.permissions().len(), Permission::ALL.len());
    }

    #[test]
    fn test_admin_slug_ignores_active_flag() {
        let actor = Actor::new(1, vec![role(1, "admin", &[], false)], None);
        assert!(actor.is_admin());
        assert!(actor.has_permission("membres.delete"));
    }

    #[test]
    fn test_admin_permission_requires_active_role() {
        let active = Actor::new(1, vec![role(2, "direction", &["admin"], true)], None);
        assert!(active.is_admin());

        let inactive = Actor::new(1, vec![role(2, "direction", &["admin"], false)], None);
        assert!(!inactive.is_admin());
        assert!(!inactive.has_permission("admin"));
    }

    #[test]
    fn test_inactive_role_contributes_nothing() {
        let actor = Actor::new(1, vec![role(3, "tresorier", &["cotisations.view"], false)], None);
        assert!(!actor.has_permission("cotisations.view"));
    }

    #[test]
    fn test_active_role_grants_listed_keys_only() {
        let actor = Actor::new(
            1,
            vec![role(3, "tresorier", &["cotisations.view", "cotisations.create"], true)],
            None,
        );
        assert!(actor.can(Permission::CotisationsView));
        assert!(actor.can(Permission::CotisationsCreate));
        assert!(!actor.can(Permission::DepensesView));
        assert!(!actor.is_admin());
    }

    #[test]
    fn test_legacy_role_is_fallback() {
        let actor = Actor::new(
            1,
            vec![role(3, "lecteur", &["membres.view"], true)],
            Some(role(4, "comptable", &["depenses.view"], true)),
        );
        assert!(actor.has_permission("membres.view"));
        assert!(actor.has_permission("depenses.view"));
    }

    #[test]
    fn test_inactive_legacy_role_contributes_nothing() {
        let actor = Actor::new(1, vec![], Some(role(4, "comptable", &["depenses.view"], false)));
        assert!(!actor.has_permission("depenses.view"));
    }

    #[test]
    fn test_legacy_admin_follows_same_rule() {
        let by_slug = Actor::new(1, vec![], Some(role(1, "admin", &[], false)));
        assert!(by_slug.is_admin());

        let by_key_active = Actor::new(1, vec![], Some(role(5, "chef", &["admin"], true)));
        assert!(by_key_active.is_admin());

        let by_key_inactive = Actor::new(1, vec![], Some(role(5, "chef", &["admin"], false)));
        assert!(!by_key_inactive.is_admin());
    }

    #[test]
    fn test_has_role_ignores_active_flag() {
        let actor = Actor::new(
            1,
            vec![role(3, "tresorier", &[], false)],
            Some(role(4, "comptable", &[], false)),
        );
        assert!(actor.has_role("tresorier"));
        assert!(actor.has_role("comptable"));
        assert!(!actor.has_role("admin"));
    }

    #[test]
    fn test_blocked_actor_holds_nothing() {
        let actor = Actor::new(1, vec![role(1, "admin", &[], true)], None).with_blocked(true);
        assert!(!actor.is_admin());
        assert!(!actor.has_permission("membres.view"));
        assert!(!actor.auth_context().can("dashboard.view"));
    }

    #[test]
    fn test_auth_context_has_exactly_ui_keys() {
        let actor = Actor::new(1, vec![role(3, "lecteur", &["membres.view", "roles.view"], true)], None);
        let ctx = actor.auth_context();
        assert!(!ctx.is_admin);
        assert_eq!(ctx.permissions.len(), 5);
        assert!(ctx.can("membres.view"));
        assert!(!ctx.can("dashboard.view"));
        assert!(!ctx.permissions.contains_key("roles.view"));
    }
}
