//! Student attendance operations.

use chrono::NaiveDate;

use crate::api::{ApiClient, ApiError};
use crate::models::AttendanceSheet;

#[derive(Clone)]
pub struct AttendanceService {
    client: ApiClient,
}

impl AttendanceService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Record (or overwrite) a group's attendance sheet for one day.
    pub async fn record(&self, sheet: &AttendanceSheet) -> Result<AttendanceSheet, ApiError> {
        self.client.post("/attendance", sheet).await
    }

    /// Attendance sheets for a group within a date range, inclusive.
    pub async fn list_for_group(
        &self,
        group_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceSheet>, ApiError> {
        self.client
            .get(&format!(
                "/groups/{}/attendance?from={}&to={}",
                group_id, from, to
            ))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<AttendanceSheet, ApiError> {
        self.client.get(&format!("/attendance/{}", id)).await
    }
}
