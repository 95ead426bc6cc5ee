use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JustificationStatus {
    Pending,
    Approved,
    Rejected,
}

/// An absence justification submitted for a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Justification {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub absence_date: NaiveDate,
    pub reason: String,
    pub status: JustificationStatus,
    /// Username of the reviewer, set once approved or rejected
    #[serde(default)]
    pub reviewed_by: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJustification {
    pub student_id: i64,
    pub absence_date: NaiveDate,
    pub reason: String,
}
