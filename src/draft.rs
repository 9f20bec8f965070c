use crate::model::{is_known_time_slot, AttendanceRecord, Subject, MAX_MATERIAL_LINKS, TIME_SLOTS};
use crate::roster::{self, TEACHERS};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde_json::Value;
use std::collections::BTreeMap;

/// Unsaved form state for one session. Only `finalize` turns it into a
/// stored record, so everything here is validated at this boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub date: String,
    pub time: String,
    pub subject: Subject,
    pub teacher: String,
    pub attendance: BTreeMap<String, bool>,
    pub links: Vec<String>,
}

impl RecordDraft {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            time: TIME_SLOTS[0].label.to_string(),
            subject: Subject::ALL[0],
            teacher: TEACHERS[0].to_string(),
            attendance: BTreeMap::new(),
            links: vec![String::new()],
        }
    }

    pub fn from_params(params: &Value, today: NaiveDate) -> Result<Self, String> {
        let mut draft = Self::new(today);

        if let Some(v) = params.get("date") {
            let s = v.as_str().ok_or("date must be a string")?.trim();
            let parsed = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| format!("date must be YYYY-MM-DD, got {:?}", s))?;
            // Stored zero-padded; month filtering relies on the prefix.
            draft.date = parsed.format("%Y-%m-%d").to_string();
        }
        if let Some(v) = params.get("time") {
            let s = v.as_str().ok_or("time must be a string")?.trim();
            if !is_known_time_slot(s) {
                return Err(format!("unknown time slot: {}", s));
            }
            draft.time = s.to_string();
        }
        if let Some(v) = params.get("subject") {
            let s = v.as_str().ok_or("subject must be a string")?;
            draft.subject = Subject::parse(s).ok_or_else(|| format!("unknown subject: {}", s))?;
        }
        if let Some(v) = params.get("teacher") {
            let s = v.as_str().ok_or("teacher must be a string")?.trim();
            if !roster::is_known_teacher(s) {
                return Err(format!("unknown teacher: {}", s));
            }
            draft.teacher = s.to_string();
        }
        if let Some(v) = params.get("attendance") {
            let obj = v.as_object().ok_or("attendance must be an object")?;
            for (id, present) in obj {
                let present = present
                    .as_bool()
                    .ok_or_else(|| format!("attendance.{} must be boolean", id))?;
                draft.attendance.insert(id.clone(), present);
            }
        }
        if let Some(v) = params.get("teachingMaterialLinks") {
            let arr = v
                .as_array()
                .ok_or("teachingMaterialLinks must be an array")?;
            draft.links = arr
                .iter()
                .map(|l| l.as_str().map(|s| s.to_string()))
                .collect::<Option<Vec<_>>>()
                .ok_or("teachingMaterialLinks entries must be strings")?;
        }
        Ok(draft)
    }

    pub fn toggle_pupil(&mut self, pupil_id: &str) {
        let cur = self.attendance.get(pupil_id).copied().unwrap_or(false);
        self.attendance.insert(pupil_id.to_string(), !cur);
    }

    /// Marks the whole year absent when every pupil in it is already
    /// present, otherwise marks the whole year present.
    pub fn toggle_year(&mut self, year: u8) {
        let pupils = roster::pupils_in_year(year);
        let all_present = pupils
            .iter()
            .all(|p| self.attendance.get(&p.id).copied().unwrap_or(false));
        for p in pupils {
            self.attendance.insert(p.id.clone(), !all_present);
        }
    }

    pub fn reset_attendance(&mut self) {
        self.attendance.clear();
    }

    pub fn present_in_year(&self, year: u8) -> usize {
        roster::pupils_in_year(year)
            .iter()
            .filter(|p| self.attendance.get(&p.id).copied().unwrap_or(false))
            .count()
    }

    pub fn add_link_field(&mut self) -> bool {
        if self.links.len() >= MAX_MATERIAL_LINKS {
            return false;
        }
        self.links.push(String::new());
        true
    }

    pub fn set_link(&mut self, index: usize, value: &str) {
        if let Some(slot) = self.links.get_mut(index) {
            *slot = value.to_string();
        }
    }

    pub fn remove_link_field(&mut self, index: usize) {
        if index < self.links.len() {
            self.links.remove(index);
        }
        if self.links.is_empty() {
            self.links.push(String::new());
        }
    }

    /// Builds the record to store. `taken` reports ids already present in
    /// the store; the millisecond id is bumped until it is free.
    pub fn finalize<Tz: TimeZone>(
        self,
        now: DateTime<Tz>,
        taken: impl Fn(&str) -> bool,
    ) -> AttendanceRecord
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut millis = now.timestamp_millis();
        let mut id = millis.to_string();
        while taken(&id) {
            millis += 1;
            id = millis.to_string();
        }

        AttendanceRecord {
            id,
            date: self.date,
            time: self.time,
            subject: self.subject,
            teacher: self.teacher,
            timestamp: now.format("%H:%M:%S").to_string(),
            attendance: normalize_attendance(self.attendance),
            teaching_material_links: normalize_links(self.links),
        }
    }
}

/// Trims links, drops blanks, keeps at most four.
pub fn normalize_links(links: Vec<String>) -> Vec<String> {
    links
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .take(MAX_MATERIAL_LINKS)
        .collect()
}

/// Keeps only roster pupils marked present; absence is implied.
pub fn normalize_attendance(attendance: BTreeMap<String, bool>) -> BTreeMap<String, bool> {
    attendance
        .into_iter()
        .filter(|(id, present)| *present && roster::is_known_pupil(id))
        .collect()
}

pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("date")
    }

    #[test]
    fn defaults_follow_first_options() {
        let d = RecordDraft::new(today());
        assert_eq!(d.date, "2024-06-01");
        assert_eq!(d.time, "0230-0330 pm");
        assert_eq!(d.subject, Subject::BahasaMelayu);
        assert_eq!(d.teacher, "ALYSA JULIA ANAK THORNLEY");
        assert_eq!(d.links, vec![String::new()]);
    }

    #[test]
    fn five_links_are_cut_to_four() {
        let params = json!({
            "teachingMaterialLinks": ["a", " ", "b", "c", "d", "e"]
        });
        let d = RecordDraft::from_params(&params, today()).expect("draft");
        let rec = d.finalize(Utc::now(), |_| false);
        assert_eq!(rec.teaching_material_links, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn unpadded_dates_are_stored_canonical() {
        let d = RecordDraft::from_params(&json!({"date": "2024-6-1"}), today()).expect("draft");
        assert_eq!(d.date, "2024-06-01");
        let d = RecordDraft::from_params(&json!({"date": " 2024-05-03 "}), today()).expect("draft");
        assert_eq!(d.date, "2024-05-03");
    }

    #[test]
    fn rejects_unknown_choices() {
        assert!(RecordDraft::from_params(&json!({"subject": "Geografi"}), today()).is_err());
        assert!(RecordDraft::from_params(&json!({"teacher": "NOBODY"}), today()).is_err());
        assert!(RecordDraft::from_params(&json!({"time": "0900-1000 am"}), today()).is_err());
        assert!(RecordDraft::from_params(&json!({"date": "01/06/2024"}), today()).is_err());
        assert!(RecordDraft::from_params(&json!({"attendance": {"x": "yes"}}), today()).is_err());
    }

    #[test]
    fn toggle_year_selects_then_clears() {
        let mut d = RecordDraft::new(today());
        d.toggle_pupil("1-danielson-bin-jason");
        d.toggle_year(1);
        assert_eq!(d.present_in_year(1), 3);
        d.toggle_year(1);
        assert_eq!(d.present_in_year(1), 0);
        d.toggle_pupil("2-melysha");
        d.reset_attendance();
        assert!(d.attendance.is_empty());
    }

    #[test]
    fn link_fields_are_bounded() {
        let mut d = RecordDraft::new(today());
        assert!(d.add_link_field());
        assert!(d.add_link_field());
        assert!(d.add_link_field());
        assert!(!d.add_link_field());
        assert_eq!(d.links.len(), 4);
        d.set_link(0, "https://example.org");
        for _ in 0..5 {
            d.remove_link_field(0);
        }
        assert_eq!(d.links, vec![String::new()]);
    }

    #[test]
    fn finalize_drops_unknown_and_absent_pupils_and_bumps_id() {
        let params = json!({
            "attendance": {
                "1-clararissa-livonia-binti-lehan": true,
                "1-danielson-bin-jason": false,
                "9-ghost": true
            }
        });
        let d = RecordDraft::from_params(&params, today()).expect("draft");
        let now = Utc.timestamp_millis_opt(1_717_200_000_000).single().expect("ts");
        let rec = d.finalize(now, |id| id == "1717200000000");
        assert_eq!(rec.id, "1717200000001");
        assert_eq!(rec.attendance.len(), 1);
        assert!(rec.is_present("1-clararissa-livonia-binti-lehan"));
        assert!(rec.teaching_material_links.is_empty());
    }
}
