use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

/// One student's mark on an attendance sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub student_id: i64,
    pub student_name: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// A group's attendance record for one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheet {
    #[serde(default)]
    pub id: Option<i64>,
    pub group_id: i64,
    pub headquarters_id: i64,
    pub date: NaiveDate,
    pub entries: Vec<AttendanceEntry>,
}

impl AttendanceSheet {
    pub fn absent_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == AttendanceStatus::Absent)
            .count()
    }
}
