use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pupil {
    pub id: String,
    pub name: String,
    pub year: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearGroup {
    pub year: u8,
    pub pupils: Vec<Pupil>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Officials {
    pub coordinator: &'static str,
    pub coordinator_title: &'static str,
    pub headmaster: &'static str,
    pub headmaster_title: &'static str,
}

pub const OFFICIALS: Officials = Officials {
    coordinator: "Encik Raffi bin Smail",
    coordinator_title: "Penolong Kanan Pentadbiran dan Akademik, SK Kg Klid/Plajau",
    headmaster: "Encik Razeli bin Sirat",
    headmaster_title: "Guru Besar SK Kg Klid/Plajau, Dalat",
};

pub const TEACHERS: [&str; 13] = [
    "ALYSA JULIA ANAK THORNLEY",
    "DAYANG ERINA NATASHA BINTI ABANG ABBEHA",
    "DAVE BIN ASON",
    "FAID BIN ZULKIFLI",
    "GRACE ANAK KANA",
    "JESSICA ANAK KATANG",
    "MARIATI BINTI PADLAM",
    "MUHAMMAD AIMAN CYPRIAN BIN MUHD NIZAM",
    "RAFFI BIN SMAIL",
    "RAZELI BIN SIRAT",
    "REBENA BINTI ASIN",
    "SAHARUDDIN BIN SAPIAE",
    "IZWANSYAH BIN LAMUHAMMADE",
];

const RAW_PUPILS: [(u8, &[&str]); 6] = [
    (
        1,
        &[
            "CLARARISSA LIVONIA BINTI LEHAN",
            "MIA ARIANA BINTI ANDUKHA ELRONDY",
            "DANIELSON BIN JASON",
        ],
    ),
    (
        2,
        &[
            "MELYSHA",
            "MICHAEL ABRAHAM MELKISEDEK",
            "NUR QYSSTINA QHAYSARA BINTI MOHD IQBAL QUSSYAIRI",
            "RAZIA ROSSA ANAK STEFFENS ANDY",
            "FARIZ NAUFAL BIN FIRDAUS AHSENG",
            "ASHRIQ AQIEL BIN RAZAN",
        ],
    ),
    (
        3,
        &[
            "RAYYEN HAYDEN BIN ALOYSIS",
            "LUCIA AMANDA BINTI ZUINI",
            "VELLVET GEORGIANA ZHI LIM",
            "KAYZILL KAYNOVIL BIN INI",
            "RACHELL ERCILIA",
        ],
    ),
    (
        4,
        &[
            "NUR FARINA BINTI ABDULLAH",
            "ABDULLAH HANIF BIN RAFFI",
            "CYRIL IGNATIUS BIN KALUNI",
            "MOHAMAD AADI PUTRA BIN ABDULLAH",
        ],
    ),
    (
        5,
        &[
            "ARMELLICIANA BINTI ARYANG",
            "JACKSON BIN JULUIENG",
            "JERALD DAMIAN BIN JASON",
            "KYRA KIRANA BINTI MAULANA",
            "VINCE DENZEL ZHEN LIM",
        ],
    ),
    (
        6,
        &[
            "DANNY ALVES BIN MAULANA",
            "KEARLY FAYREENDY BIN KENNEDY",
            "NUR ANISYA BINTI JAMEJAMY",
            "RACHEL JANE ANAK STEFFENS ANDY",
        ],
    ),
];

/// Stable pupil id: `{year}-{name}` with whitespace runs collapsed to `-`
/// and lowercased. Stored attendance maps are keyed by this value.
pub fn pupil_id(year: u8, name: &str) -> String {
    let slug = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    format!("{}-{}", year, slug)
}

fn build_pupils() -> Vec<Pupil> {
    let mut out = Vec::new();
    for (year, names) in RAW_PUPILS {
        let mut sorted: Vec<&str> = names.to_vec();
        sorted.sort_unstable();
        for name in sorted {
            out.push(Pupil {
                id: pupil_id(year, name),
                name: name.to_string(),
                year,
            });
        }
    }
    out
}

/// Full roster in report order: years ascending, names alphabetical within a year.
pub fn all_pupils() -> &'static [Pupil] {
    static PUPILS: OnceLock<Vec<Pupil>> = OnceLock::new();
    PUPILS.get_or_init(build_pupils)
}

pub fn roster_size() -> usize {
    all_pupils().len()
}

pub fn is_known_pupil(id: &str) -> bool {
    all_pupils().iter().any(|p| p.id == id)
}

pub fn is_known_teacher(name: &str) -> bool {
    TEACHERS.contains(&name)
}

pub fn pupils_in_year(year: u8) -> Vec<&'static Pupil> {
    all_pupils().iter().filter(|p| p.year == year).collect()
}

pub fn years() -> Vec<YearGroup> {
    (1..=6)
        .map(|year| YearGroup {
            year,
            pupils: pupils_in_year(year).into_iter().cloned().collect(),
        })
        .collect()
}

/// Ids derived by more than one roster entry. Two same-named pupils in the
/// same year collapse onto one attendance key.
pub fn duplicate_pupil_ids() -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for p in all_pupils() {
        *seen.entry(p.id.as_str()).or_default() += 1;
    }
    let mut dups: Vec<String> = seen
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(id, _)| id.to_string())
        .collect();
    dups.sort();
    dups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_stable_and_slugged() {
        assert_eq!(
            pupil_id(1, "CLARARISSA LIVONIA BINTI LEHAN"),
            "1-clararissa-livonia-binti-lehan"
        );
        assert_eq!(pupil_id(2, "  MELYSHA  "), "2-melysha");
        assert_eq!(pupil_id(3, "A\tB  C"), "3-a-b-c");
    }

    #[test]
    fn roster_is_sorted_within_each_year() {
        let pupils = all_pupils();
        assert_eq!(pupils.len(), 27);
        assert_eq!(pupils[0].name, "CLARARISSA LIVONIA BINTI LEHAN");
        assert_eq!(pupils[1].name, "DANIELSON BIN JASON");
        assert_eq!(pupils[2].name, "MIA ARIANA BINTI ANDUKHA ELRONDY");
        for w in pupils.windows(2) {
            assert!(w[0].year <= w[1].year);
            if w[0].year == w[1].year {
                assert!(w[0].name <= w[1].name);
            }
        }
    }

    #[test]
    fn year_groups_cover_roster() {
        let groups = years();
        assert_eq!(groups.len(), 6);
        let total: usize = groups.iter().map(|g| g.pupils.len()).sum();
        assert_eq!(total, roster_size());
        assert_eq!(groups[1].pupils.len(), 6);
        assert!(duplicate_pupil_ids().is_empty());
    }

    #[test]
    fn teachers_lookup() {
        assert!(is_known_teacher("RAFFI BIN SMAIL"));
        assert!(!is_known_teacher("raffi bin smail"));
        assert!(is_known_pupil("6-rachel-jane-anak-steffens-andy"));
    }
}
