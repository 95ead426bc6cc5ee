//! Absence justification operations.

use crate::api::{ApiClient, ApiError};
use crate::models::{Justification, NewJustification};

#[derive(Clone)]
pub struct JustificationService {
    client: ApiClient,
}

impl JustificationService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn submit(&self, new: &NewJustification) -> Result<Justification, ApiError> {
        self.client.post("/justifications", new).await
    }

    pub async fn list_pending(
        &self,
        headquarters_id: i64,
    ) -> Result<Vec<Justification>, ApiError> {
        self.client
            .get(&format!(
                "/headquarters/{}/justifications?status=pending",
                headquarters_id
            ))
            .await
    }

    pub async fn approve(&self, id: i64) -> Result<Justification, ApiError> {
        self.review(id, "approved").await
    }

    pub async fn reject(&self, id: i64) -> Result<Justification, ApiError> {
        self.review(id, "rejected").await
    }

    async fn review(&self, id: i64, status: &str) -> Result<Justification, ApiError> {
        self.client
            .put(
                &format!("/justifications/{}/review", id),
                &serde_json::json!({ "status": status }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_EXPIRES_KEY};
    use crate::auth::{MemoryStore, SessionManager, SessionStore};
    use crate::config::Config;

    use std::sync::Arc;

    use chrono::Utc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service_for(server: &MockServer) -> JustificationService {
        let store = Arc::new(MemoryStore::new());
        store.set(ACCESS_TOKEN_KEY, "access-ok");
        store.set(REFRESH_TOKEN_KEY, "refresh-ok");
        store.set(
            TOKEN_EXPIRES_KEY,
            &(Utc::now().timestamp_millis() + 60_000).to_string(),
        );
        let config = Config {
            api_base_url: server.uri(),
            auth_base_url: server.uri(),
            last_username: None,
        };
        let session = Arc::new(SessionManager::new(store, &config).expect("manager"));
        let client = ApiClient::new(&config, session).expect("client");
        JustificationService::new(client)
    }

    #[tokio::test]
    async fn test_approve_sends_review_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/justifications/90/review"))
            .and(body_json(serde_json::json!({"status": "approved"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 90,
                "studentId": 2,
                "studentName": "Mateo Gil",
                "absenceDate": "2026-08-20",
                "reason": "medical appointment",
                "status": "approved",
                "reviewedBy": "coordinator1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let reviewed = service.approve(90).await.expect("approve");
        assert_eq!(reviewed.status, crate::models::JustificationStatus::Approved);
        assert_eq!(reviewed.reviewed_by.as_deref(), Some("coordinator1"));
    }
}
