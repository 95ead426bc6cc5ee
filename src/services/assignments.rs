//! Staff assignment operations.

use chrono::NaiveDate;

use crate::api::{ApiClient, ApiError};
use crate::models::{NewStaffAssignment, StaffAssignment};

#[derive(Clone)]
pub struct AssignmentService {
    client: ApiClient,
}

impl AssignmentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_for_headquarters(
        &self,
        headquarters_id: i64,
    ) -> Result<Vec<StaffAssignment>, ApiError> {
        self.client
            .get(&format!("/headquarters/{}/assignments", headquarters_id))
            .await
    }

    pub async fn create(&self, new: &NewStaffAssignment) -> Result<StaffAssignment, ApiError> {
        self.client.post("/assignments", new).await
    }

    /// Close an assignment by setting its end date.
    pub async fn end(&self, id: i64, end_date: NaiveDate) -> Result<StaffAssignment, ApiError> {
        self.client
            .put(
                &format!("/assignments/{}/end", id),
                &serde_json::json!({ "endDate": end_date }),
            )
            .await
    }
}
