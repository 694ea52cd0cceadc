//! Locale and user-facing message catalogue
//!
//! There is no process-wide locale: every function that formats text for a
//! person takes a [`Locale`] argument, usually resolved once per request from
//! configuration or the caller's preference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MONTHS_FR: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::En => "en",
        }
    }

    /// Month name for 1..=12; out-of-range months render as the number
    pub fn month_name(&self, month: u32) -> String {
        let table = match self {
            Locale::Fr => &MONTHS_FR,
            Locale::En => &MONTHS_EN,
        };
        match month {
            1..=12 => table[(month - 1) as usize].to_string(),
            other => other.to_string(),
        }
    }

    /// Bucket label for records whose member has no locality
    pub fn no_locality(&self) -> &'static str {
        match self {
            Locale::Fr => "Sans localité",
            Locale::En => "No locality",
        }
    }

    pub fn dues_report_title(&self, association: &str) -> String {
        match self {
            Locale::Fr => format!("COTISATIONS {association}"),
            Locale::En => format!("DUES {association}"),
        }
    }

    pub fn expenses_report_title(&self, association: &str) -> String {
        match self {
            Locale::Fr => format!("DÉPENSES MÉDICALES {association}"),
            Locale::En => format!("MEDICAL EXPENSES {association}"),
        }
    }

    pub fn roster_title(&self, association: &str) -> String {
        match self {
            Locale::Fr => format!("LISTE DES MEMBRES {association}"),
            Locale::En => format!("MEMBER LIST {association}"),
        }
    }

    pub fn member_status(&self, active: bool) -> &'static str {
        match (self, active) {
            (Locale::Fr, true) => "Actif",
            (Locale::Fr, false) => "Inactif",
            (Locale::En, true) => "Active",
            (Locale::En, false) => "Inactive",
        }
    }

    /// Summary line for a bulk dues submission
    pub fn upsert_summary(&self, created: usize, updated: usize) -> String {
        let mut parts = Vec::with_capacity(2);
        match self {
            Locale::Fr => {
                if created > 0 {
                    parts.push(format!("{created} cotisation(s) créée(s)"));
                }
                if updated > 0 {
                    parts.push(format!("{updated} cotisation(s) mise(s) à jour"));
                }
                format!("{} avec succès.", parts.join(" et "))
            }
            Locale::En => {
                if created > 0 {
                    parts.push(format!("{created} dues record(s) created"));
                }
                if updated > 0 {
                    parts.push(format!("{updated} dues record(s) updated"));
                }
                format!("{} successfully.", parts.join(" and "))
            }
        }
    }

    // ==================== Validation messages ====================

    pub fn required(&self, field: &str) -> String {
        match self {
            Locale::Fr => format!("Le champ {field} est obligatoire."),
            Locale::En => format!("The {field} field is required."),
        }
    }

    pub fn min_zero(&self, field: &str) -> String {
        match self {
            Locale::Fr => format!("Le champ {field} doit être supérieur ou égal à 0."),
            Locale::En => format!("The {field} field must be at least 0."),
        }
    }

    pub fn max_amount(&self, field: &str, max: f64) -> String {
        match self {
            Locale::Fr => format!("Le champ {field} ne doit pas dépasser {max}."),
            Locale::En => format!("The {field} field must not be greater than {max}."),
        }
    }

    pub fn not_a_number(&self, field: &str) -> String {
        match self {
            Locale::Fr => format!("Le champ {field} doit être un nombre."),
            Locale::En => format!("The {field} field must be a number."),
        }
    }

    pub fn too_long(&self, field: &str, max: usize) -> String {
        match self {
            Locale::Fr => format!("Le champ {field} ne doit pas dépasser {max} caractères."),
            Locale::En => format!("The {field} field must not be greater than {max} characters."),
        }
    }

    pub fn invalid_format(&self, field: &str) -> String {
        match self {
            Locale::Fr => format!("Le format du champ {field} est invalide."),
            Locale::En => format!("The {field} field format is invalid."),
        }
    }

    pub fn invalid_year(&self, field: &str) -> String {
        match self {
            Locale::Fr => format!("Le champ {field} doit être une année sur 4 chiffres."),
            Locale::En => format!("The {field} field must be a 4-digit year."),
        }
    }

    pub fn invalid_month(&self, field: &str) -> String {
        match self {
            Locale::Fr => format!("Le champ {field} doit être un mois entre 1 et 12."),
            Locale::En => format!("The {field} field must be a month between 1 and 12."),
        }
    }

    pub fn invalid_date(&self, field: &str) -> String {
        match self {
            Locale::Fr => format!("Le champ {field} n'est pas une date valide."),
            Locale::En => format!("The {field} field is not a valid date."),
        }
    }

    /// Referenced row does not exist (`exists:` rule)
    pub fn not_exists(&self, field: &str) -> String {
        match self {
            Locale::Fr => format!("Le champ {field} sélectionné est invalide."),
            Locale::En => format!("The selected {field} is invalid."),
        }
    }

    pub fn already_taken(&self, field: &str) -> String {
        match self {
            Locale::Fr => format!("La valeur du champ {field} est déjà utilisée."),
            Locale::En => format!("The {field} has already been taken."),
        }
    }

    pub fn unknown_permission(&self, key: &str) -> String {
        match self {
            Locale::Fr => format!("La permission « {key} » n'existe pas."),
            Locale::En => format!("Permission \"{key}\" does not exist."),
        }
    }

    pub fn unsupported_file(&self, field: &str, accepted: &str) -> String {
        match self {
            Locale::Fr => format!("Le fichier {field} doit être de type : {accepted}."),
            Locale::En => format!("The {field} must be a file of type: {accepted}."),
        }
    }

    pub fn file_too_large(&self, field: &str, max_kb: u64) -> String {
        match self {
            Locale::Fr => format!("Le fichier {field} ne doit pas dépasser {max_kb} kilo-octets."),
            Locale::En => format!("The {field} must not be greater than {max_kb} kilobytes."),
        }
    }

    pub fn empty_batch(&self) -> &'static str {
        match self {
            Locale::Fr => "Au moins une cotisation est requise.",
            Locale::En => "At least one dues entry is required.",
        }
    }

    // ==================== Role management ====================

    pub fn role_in_use(&self) -> &'static str {
        match self {
            Locale::Fr => {
                "Ce rôle ne peut pas être supprimé car il est assigné à des utilisateurs."
            }
            Locale::En => "This role cannot be deleted because it is assigned to users.",
        }
    }

    pub fn role_reserved(&self) -> &'static str {
        match self {
            Locale::Fr => "Le rôle administrateur ne peut pas être supprimé.",
            Locale::En => "The administrator role cannot be deleted.",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let lang = lower.split(['-', '_']).next().unwrap_or_default();
        match lang {
            "fr" => Ok(Locale::Fr),
            "en" => Ok(Locale::En),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_names() {
        assert_eq!(Locale::Fr.month_name(2), "Février");
        assert_eq!(Locale::Fr.month_name(8), "Août");
        assert_eq!(Locale::En.month_name(12), "December");
        assert_eq!(Locale::Fr.month_name(13), "13");
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!("fr_FR".parse::<Locale>(), Ok(Locale::Fr));
        assert_eq!("EN-us".parse::<Locale>(), Ok(Locale::En));
        assert!("de".parse::<Locale>().is_err());
    }

    #[test]
    fn test_upsert_summary_fr() {
        assert_eq!(
            Locale::Fr.upsert_summary(2, 1),
            "2 cotisation(s) créée(s) et 1 cotisation(s) mise(s) à jour avec succès."
        );
        assert_eq!(
            Locale::Fr.upsert_summary(0, 3),
            "3 cotisation(s) mise(s) à jour avec succès."
        );
    }

    #[test]
    fn test_upsert_summary_en() {
        assert_eq!(
            Locale::En.upsert_summary(1, 0),
            "1 dues record(s) created successfully."
        );
    }
}
