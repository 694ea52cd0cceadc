//! Permission Definitions
//!
//! Typed catalogue of the back-office permissions. Role permission sets are
//! stored as key strings (`"membres.view"`); [`validate_permission_keys`]
//! keeps unknown keys out of storage.
//!
//! ## Conventions
//! - `<module>.view` gates listing pages and print views
//! - `<module>.create|edit|delete` gate writes
//! - `admin` grants everything, including user and role management

use serde::{Deserialize, Serialize};
use shared::error::FieldErrors;
use shared::i18n::Locale;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "membres.view")]
    MembresView,
    #[serde(rename = "membres.create")]
    MembresCreate,
    #[serde(rename = "membres.edit")]
    MembresEdit,
    #[serde(rename = "membres.delete")]
    MembresDelete,
    #[serde(rename = "cotisations.view")]
    CotisationsView,
    #[serde(rename = "cotisations.create")]
    CotisationsCreate,
    #[serde(rename = "cotisations.edit")]
    CotisationsEdit,
    #[serde(rename = "cotisations.delete")]
    CotisationsDelete,
    #[serde(rename = "depenses.view")]
    DepensesView,
    #[serde(rename = "depenses.create")]
    DepensesCreate,
    #[serde(rename = "depenses.edit")]
    DepensesEdit,
    #[serde(rename = "depenses.delete")]
    DepensesDelete,
    #[serde(rename = "dashboard.view")]
    DashboardView,
    #[serde(rename = "parametres.view")]
    ParametresView,
    #[serde(rename = "parametres.manage")]
    ParametresManage,
    #[serde(rename = "utilisateurs.view")]
    UtilisateursView,
    #[serde(rename = "utilisateurs.create")]
    UtilisateursCreate,
    #[serde(rename = "utilisateurs.edit")]
    UtilisateursEdit,
    #[serde(rename = "utilisateurs.delete")]
    UtilisateursDelete,
    #[serde(rename = "roles.view")]
    RolesView,
    #[serde(rename = "roles.create")]
    RolesCreate,
    #[serde(rename = "roles.edit")]
    RolesEdit,
    #[serde(rename = "roles.delete")]
    RolesDelete,
    #[serde(rename = "admin")]
    Admin,
}

impl Permission {
    /// Catalogue order (as shown on role forms)
    pub const ALL: &'static [Permission] = &[
        Permission::MembresView,
        Permission::MembresCreate,
        Permission::MembresEdit,
        Permission::MembresDelete,
        Permission::CotisationsView,
        Permission::CotisationsCreate,
        Permission::CotisationsEdit,
        Permission::CotisationsDelete,
        Permission::DepensesView,
        Permission::DepensesCreate,
        Permission::DepensesEdit,
        Permission::DepensesDelete,
        Permission::DashboardView,
        Permission::ParametresView,
        Permission::ParametresManage,
        Permission::UtilisateursView,
        Permission::UtilisateursCreate,
        Permission::UtilisateursEdit,
        Permission::UtilisateursDelete,
        Permission::RolesView,
        Permission::RolesCreate,
        Permission::RolesEdit,
        Permission::RolesDelete,
        Permission::Admin,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Permission::MembresView => "membres.view",
            Permission::MembresCreate => "membres.create",
            Permission::MembresEdit => "membres.edit",
            Permission::MembresDelete => "membres.delete",
            Permission::CotisationsView => "cotisations.view",
            Permission::CotisationsCreate => "cotisations.create",
            Permission::CotisationsEdit => "cotisations.edit",
            Permission::CotisationsDelete => "cotisations.delete",
            Permission::DepensesView => "depenses.view",
            Permission::DepensesCreate => "depenses.create",
            Permission::DepensesEdit => "depenses.edit",
            Permission::DepensesDelete => "depenses.delete",
            Permission::DashboardView => "dashboard.view",
            Permission::ParametresView => "parametres.view",
            Permission::ParametresManage => "parametres.manage",
            Permission::UtilisateursView => "utilisateurs.view",
            Permission::UtilisateursCreate => "utilisateurs.create",
            Permission::UtilisateursEdit => "utilisateurs.edit",
            Permission::UtilisateursDelete => "utilisateurs.delete",
            Permission::RolesView => "roles.view",
            Permission::RolesCreate => "roles.create",
            Permission::RolesEdit => "roles.edit",
            Permission::RolesDelete => "roles.delete",
            Permission::Admin => "admin",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.key() == key)
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Fr => self.label_fr(),
            Locale::En => self.label_en(),
        }
    }

    fn label_fr(&self) -> &'static str {
        match self {
            Permission::MembresView => "Voir les membres",
            Permission::MembresCreate => "Créer des membres",
            Permission::MembresEdit => "Modifier des membres",
            Permission::MembresDelete => "Supprimer des membres",
            Permission::CotisationsView => "Voir les cotisations",
            Permission::CotisationsCreate => "Créer des cotisations",
            Permission::CotisationsEdit => "Modifier des cotisations",
            Permission::CotisationsDelete => "Supprimer des cotisations",
            Permission::DepensesView => "Voir les dépenses",
            Permission::DepensesCreate => "Créer des dépenses",
            Permission::DepensesEdit => "Modifier des dépenses",
            Permission::DepensesDelete => "Supprimer des dépenses",
            Permission::DashboardView => "Voir le tableau de bord",
            Permission::ParametresView => "Voir les paramètres",
            Permission::ParametresManage => "Gérer les paramètres",
            Permission::UtilisateursView => "Voir les utilisateurs",
            Permission::UtilisateursCreate => "Créer des utilisateurs",
            Permission::UtilisateursEdit => "Modifier les utilisateurs",
            Permission::UtilisateursDelete => "Supprimer les utilisateurs",
            Permission::RolesView => "Voir les rôles",
            Permission::RolesCreate => "Créer des rôles",
            Permission::RolesEdit => "Modifier les rôles",
            Permission::RolesDelete => "Supprimer les rôles",
            Permission::Admin => "Administrateur (toutes les permissions)",
        }
    }

    fn label_en(&self) -> &'static str {
        match self {
            Permission::MembresView => "View members",
            Permission::MembresCreate => "Create members",
            Permission::MembresEdit => "Edit members",
            Permission::MembresDelete => "Delete members",
            Permission::CotisationsView => "View dues",
            Permission::CotisationsCreate => "Create dues",
            Permission::CotisationsEdit => "Edit dues",
            Permission::CotisationsDelete => "Delete dues",
            Permission::DepensesView => "View expenses",
            Permission::DepensesCreate => "Create expenses",
            Permission::DepensesEdit => "Edit expenses",
            Permission::DepensesDelete => "Delete expenses",
            Permission::DashboardView => "View dashboard",
            Permission::ParametresView => "View settings",
            Permission::ParametresManage => "Manage settings",
            Permission::UtilisateursView => "View users",
            Permission::UtilisateursCreate => "Create users",
            Permission::UtilisateursEdit => "Edit users",
            Permission::UtilisateursDelete => "Delete users",
            Permission::RolesView => "View roles",
            Permission::RolesCreate => "Create roles",
            Permission::RolesEdit => "Edit roles",
            Permission::RolesDelete => "Delete roles",
            Permission::Admin => "Administrator (all permissions)",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("unknown permission: {s}"))
    }
}

/// Keys surfaced to the presentation layer on every request
pub const UI_PERMISSIONS: &[Permission] = &[
    Permission::DashboardView,
    Permission::MembresView,
    Permission::CotisationsView,
    Permission::DepensesView,
    Permission::ParametresView,
];

/// Default permissions of the seeded administrator role
pub const DEFAULT_ADMIN_PERMISSIONS: &[Permission] = &[Permission::Admin];

/// `(key, label)` pairs for role forms, in catalogue order
pub fn catalog(locale: Locale) -> Vec<(&'static str, &'static str)> {
    Permission::ALL
        .iter()
        .map(|p| (p.key(), p.label(locale)))
        .collect()
}

/// Validate if a permission string is a catalogue key
pub fn is_valid_permission(key: &str) -> bool {
    Permission::from_key(key).is_some()
}

/// Check role permission keys against the catalogue
///
/// Returns the keys with duplicates removed (first occurrence kept), or
/// field errors keyed `permissions.<index>` for every unknown key.
pub fn validate_permission_keys(keys: &[String], locale: Locale) -> Result<Vec<String>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut seen: Vec<Permission> = Vec::with_capacity(keys.len());

    for (index, key) in keys.iter().enumerate() {
        match Permission::from_key(key.trim()) {
            Some(p) => {
                if !seen.contains(&p) {
                    seen.push(p);
                }
            }
            None => errors.add(format!("permissions.{index}"), locale.unknown_permission(key)),
        }
    }

    if errors.is_empty() {
        Ok(seen.into_iter().map(|p| p.key().to_string()).collect())
    } else {
        Err(errors)
    }
}
