use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A staff member's assignment to a headquarters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAssignment {
    pub id: i64,
    pub headquarters_id: i64,
    pub person_name: String,
    /// National identity document number
    pub document: String,
    /// Role at the site: teacher, auxiliary, secretary, ...
    pub role: String,
    pub start_date: NaiveDate,
    /// Open-ended assignments have no end date
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl StaffAssignment {
    /// An assignment is active when it has not been end-dated before `on`.
    pub fn is_active_on(&self, on: NaiveDate) -> bool {
        self.start_date <= on && self.end_date.map(|end| on <= end).unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStaffAssignment {
    pub headquarters_id: i64,
    pub person_name: String,
    pub document: String,
    pub role: String,
    pub start_date: NaiveDate,
}
