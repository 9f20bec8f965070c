use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAX_MATERIAL_LINKS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    #[serde(rename = "Bahasa Melayu")]
    BahasaMelayu,
    #[serde(rename = "Sains")]
    Sains,
    #[serde(rename = "Bahasa Inggeris")]
    BahasaInggeris,
    #[serde(rename = "Sejarah")]
    Sejarah,
    #[serde(rename = "Matematik")]
    Matematik,
}

impl Subject {
    pub const ALL: [Subject; 5] = [
        Subject::BahasaMelayu,
        Subject::Sains,
        Subject::BahasaInggeris,
        Subject::Sejarah,
        Subject::Matematik,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Subject::BahasaMelayu => "Bahasa Melayu",
            Subject::Sains => "Sains",
            Subject::BahasaInggeris => "Bahasa Inggeris",
            Subject::Sejarah => "Sejarah",
            Subject::Matematik => "Matematik",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s.trim())
    }

    /// Last word of the display name, used for narrow chart labels.
    pub fn short_label(self) -> &'static str {
        self.as_str().rsplit(' ').next().unwrap_or(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub id: &'static str,
    pub label: &'static str,
}

pub const TIME_SLOTS: [TimeSlot; 4] = [
    TimeSlot {
        id: "1",
        label: "0230-0330 pm",
    },
    TimeSlot {
        id: "2",
        label: "0700-0800 pm",
    },
    TimeSlot {
        id: "3",
        label: "0800-0900 pm",
    },
    TimeSlot {
        id: "4",
        label: "0830-0930 pm",
    },
];

pub fn is_known_time_slot(label: &str) -> bool {
    TIME_SLOTS.iter().any(|t| t.label == label)
}

/// One tutoring session as stored under the `attendance_records` key.
///
/// Field names match the JSON written by the browser build so existing
/// workspaces keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub date: String,
    pub time: String,
    pub subject: Subject,
    pub teacher: String,
    pub timestamp: String,
    #[serde(default)]
    pub attendance: BTreeMap<String, bool>,
    #[serde(default)]
    pub teaching_material_links: Vec<String>,
}

impl AttendanceRecord {
    pub fn is_present(&self, pupil_id: &str) -> bool {
        self.attendance.get(pupil_id).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_serializes_as_display_name() {
        let v = serde_json::to_value(Subject::BahasaInggeris).expect("serialize");
        assert_eq!(v, serde_json::json!("Bahasa Inggeris"));
        assert_eq!(Subject::parse(" Matematik "), Some(Subject::Matematik));
        assert_eq!(Subject::parse("Geografi"), None);
        assert_eq!(Subject::BahasaMelayu.short_label(), "Melayu");
    }

    #[test]
    fn record_reads_browser_json_shape() {
        let raw = r#"{
            "id": "1717200000000",
            "date": "2024-06-01",
            "time": "0230-0330 pm",
            "subject": "Sains",
            "teacher": "DAVE BIN ASON",
            "timestamp": "2:30:00 PM",
            "attendance": {"1-danielson-bin-jason": true, "2-melysha": false},
            "teachingMaterialLinks": ["https://example.org/a"]
        }"#;
        let rec: AttendanceRecord = serde_json::from_str(raw).expect("parse record");
        assert_eq!(rec.subject, Subject::Sains);
        assert!(rec.is_present("1-danielson-bin-jason"));
        assert!(!rec.is_present("2-melysha"));
        assert!(!rec.is_present("6-unknown"));
        let back = serde_json::to_value(&rec).expect("serialize");
        assert!(back.get("teachingMaterialLinks").is_some());
    }

    #[test]
    fn theme_parse_and_toggle() {
        assert_eq!(Theme::parse("DARK"), Some(Theme::Dark));
        assert_eq!(Theme::parse("sepia"), None);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
