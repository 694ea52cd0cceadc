//! Printable member roster

use indexmap::IndexMap;
use serde::Serialize;
use shared::i18n::Locale;
use shared::models::MembreWithLocalite;

#[derive(Debug, Clone, Serialize)]
pub struct RosterGroup {
    pub label: String,
    pub members: Vec<MembreWithLocalite>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberRoster {
    pub title: String,
    pub locality_selected: bool,
    pub search: Option<String>,
    pub groups: Vec<RosterGroup>,
}

/// Group members (already ordered by first name) by locality label in
/// first-occurrence order. No totals.
pub fn build_roster(
    members: Vec<MembreWithLocalite>,
    locality_selected: bool,
    search: Option<String>,
    locale: Locale,
    association: &str,
) -> MemberRoster {
    let mut groups: IndexMap<String, Vec<MembreWithLocalite>> = IndexMap::new();
    for member in members {
        let label = member
            .localite_libelle
            .clone()
            .unwrap_or_else(|| locale.no_locality().to_string());
        groups.entry(label).or_default().push(member);
    }

    MemberRoster {
        title: locale.roster_title(association),
        locality_selected,
        search,
        groups: groups
            .into_iter()
            .map(|(label, members)| RosterGroup { label, members })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Membre;

    fn member(id: i64, prenom: &str, localite: Option<&str>) -> MembreWithLocalite {
        MembreWithLocalite {
            membre: Membre {
                id,
                utilisateur_id: None,
                nom: "Koné".into(),
                prenom: prenom.into(),
                telephone: None,
                localite_id: localite.map(|_| 1),
                photo_url: None,
                adresse: None,
                date_adhesion: None,
                statut: 0,
                created_at: 0,
                updated_at: 0,
            },
            localite_libelle: localite.map(str::to_string),
        }
    }

    #[test]
    fn test_groups_in_first_occurrence_order() {
        let roster = build_roster(
            vec![
                member(1, "Aïcha", Some("Daloa")),
                member(2, "Bakary", None),
                member(3, "Chantal", Some("Daloa")),
            ],
            false,
            None,
            Locale::Fr,
            "ZIKOBOUÉ POUR LA VIE",
        );
        assert_eq!(roster.title, "LISTE DES MEMBRES ZIKOBOUÉ POUR LA VIE");
        assert_eq!(roster.groups.len(), 2);
        assert_eq!(roster.groups[0].label, "Daloa");
        assert_eq!(roster.groups[0].members.len(), 2);
        assert_eq!(roster.groups[1].label, "Sans localité");
    }
}
