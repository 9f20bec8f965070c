use crate::model::{AttendanceRecord, Subject};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubjectCount {
    pub subject: Subject,
    pub count: usize,
}

/// Session count per subject, always listing every subject in enum order.
pub fn subject_counts(records: &[AttendanceRecord]) -> Vec<SubjectCount> {
    let mut out: Vec<SubjectCount> = Subject::ALL
        .iter()
        .map(|&subject| SubjectCount { subject, count: 0 })
        .collect();
    for r in records {
        if let Some(slot) = out.iter_mut().find(|c| c.subject == r.subject) {
            slot.count += 1;
        }
    }
    out
}

pub fn present_count(record: &AttendanceRecord) -> usize {
    record.attendance.values().filter(|v| **v).count()
}

/// Present pupils over the full roster, in 0.0..=1.0. Display only.
pub fn attendance_rate(record: &AttendanceRecord, roster_size: usize) -> f64 {
    if roster_size == 0 {
        return 0.0;
    }
    present_count(record) as f64 / roster_size as f64
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectBar {
    pub subject: Subject,
    pub label: &'static str,
    pub count: usize,
    pub share_pct: f64,
    pub bar_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_sessions: usize,
    pub registered_pupils: usize,
    pub max_sessions: usize,
    pub subjects: Vec<SubjectBar>,
}

pub fn dashboard(records: &[AttendanceRecord], roster_size: usize) -> Dashboard {
    let counts = subject_counts(records);
    let total = records.len();
    let max_sessions = counts.iter().map(|c| c.count).max().unwrap_or(0).max(1);
    let subjects = counts
        .into_iter()
        .map(|c| SubjectBar {
            subject: c.subject,
            label: c.subject.short_label(),
            count: c.count,
            share_pct: if total > 0 {
                c.count as f64 * 100.0 / total as f64
            } else {
                0.0
            },
            bar_pct: c.count as f64 * 100.0 / max_sessions as f64,
        })
        .collect();
    Dashboard {
        total_sessions: total,
        registered_pupils: roster_size,
        max_sessions,
        subjects,
    }
}
