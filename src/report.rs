use crate::model::AttendanceRecord;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let t = raw.trim();
        let Some((y, m)) = t.split_once('-') else {
            return Err("month must be YYYY-MM".to_string());
        };
        let year = y
            .parse::<i32>()
            .map_err(|_| "month year must be numeric".to_string())?;
        let month = m
            .parse::<u32>()
            .map_err(|_| "month must be YYYY-MM".to_string())?;
        if !(1..=12).contains(&month) {
            return Err("month must be between 01 and 12".to_string());
        }
        Ok(Self { year, month })
    }

    fn key(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Stored dates are canonical `YYYY-MM-DD`, so the month is a prefix.
    fn contains(self, date: &str) -> bool {
        date.starts_with(&self.key())
    }
}

/// Month and free-text criteria; `None`/blank fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub month: Option<YearMonth>,
    pub query: String,
}

impl ReportFilter {
    pub fn apply<'a>(&self, records: &'a [AttendanceRecord]) -> Vec<&'a AttendanceRecord> {
        let by_month = match self.month {
            Some(m) => filter_by_month(records, m),
            None => records.iter().collect(),
        };
        filter_by_query(by_month, &self.query)
    }
}

fn matches_query(record: &AttendanceRecord, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    record.teacher.to_lowercase().contains(&q) || record.subject.as_str().to_lowercase().contains(&q)
}

pub fn filter_by_month<'a>(
    records: impl IntoIterator<Item = &'a AttendanceRecord>,
    month: YearMonth,
) -> Vec<&'a AttendanceRecord> {
    records.into_iter().filter(|r| month.contains(&r.date)).collect()
}

pub fn filter_by_query<'a>(
    records: impl IntoIterator<Item = &'a AttendanceRecord>,
    query: &str,
) -> Vec<&'a AttendanceRecord> {
    records.into_iter().filter(|r| matches_query(r, query)).collect()
}

/// Selected records in store order; ids not in the store are ignored.
pub fn select_by_ids<'a>(records: &'a [AttendanceRecord], ids: &[String]) -> Vec<&'a AttendanceRecord> {
    let wanted: HashSet<&str> = ids.iter().map(|s| s.as_str()).collect();
    records.iter().filter(|r| wanted.contains(r.id.as_str())).collect()
}
