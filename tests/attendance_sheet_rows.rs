#[path = "../src/model.rs"]
mod model;
#[path = "../src/pdf/layout.rs"]
mod layout;
#[path = "../src/roster.rs"]
mod roster;

use layout::{build_sheet, layout_document, Item, PageKind, Presence, ABSENT_LABEL, PRESENT_LABEL};
use model::{AttendanceRecord, Subject};
use std::collections::BTreeMap;

fn record_with(present: &[String], extra: &[(&str, bool)]) -> AttendanceRecord {
    let mut attendance: BTreeMap<String, bool> = present.iter().map(|id| (id.clone(), true)).collect();
    for (id, v) in extra {
        attendance.insert(id.to_string(), *v);
    }
    AttendanceRecord {
        id: "1717200000000".to_string(),
        date: "2024-06-01".to_string(),
        time: "0230-0330 pm".to_string(),
        subject: Subject::Matematik,
        teacher: "RAFFI BIN SMAIL".to_string(),
        timestamp: "14:30:00".to_string(),
        attendance,
        teaching_material_links: Vec::new(),
    }
}

#[test]
fn every_prefix_of_the_roster_prints_full_table() {
    let ids: Vec<String> = roster::all_pupils().iter().map(|p| p.id.clone()).collect();
    for n in 0..=ids.len() {
        let rec = record_with(&ids[..n], &[]);
        let sheet = build_sheet(&rec);
        assert_eq!(sheet.rows.len(), ids.len());
        let present = sheet.rows.iter().filter(|r| r.status == Presence::Present).count();
        assert_eq!(present, n, "prefix {}", n);
        for (row, pupil) in sheet.rows.iter().zip(roster::all_pupils()) {
            assert_eq!(row.name, pupil.name);
        }
    }
}

#[test]
fn stray_and_false_keys_do_not_add_rows() {
    let rec = record_with(
        &["2-melysha".to_string()],
        &[("9-not-on-roster", true), ("1-danielson-bin-jason", false)],
    );
    let doc = layout_document(&[&rec]);
    let statuses: Vec<&str> = doc
        .pages
        .iter()
        .flat_map(|p| p.items.iter())
        .filter_map(|i| match i {
            Item::Text { text, .. } if text == PRESENT_LABEL || text == ABSENT_LABEL => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(statuses.len(), roster::roster_size());
    assert_eq!(statuses.iter().filter(|s| **s == PRESENT_LABEL).count(), 1);
    assert_eq!(doc.pages[0].kind, PageKind::Record);
}
