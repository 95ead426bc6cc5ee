//! CRUD operations for institutions, plus the session-scoped cache of the
//! currently selected institution.

use crate::api::{ApiClient, ApiError};
use crate::models::{Institution, NewInstitution};

#[derive(Clone)]
pub struct InstitutionService {
    client: ApiClient,
}

impl InstitutionService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Institution>, ApiError> {
        self.client.get("/institutions").await
    }

    pub async fn get(&self, id: i64) -> Result<Institution, ApiError> {
        self.client.get(&format!("/institutions/{}", id)).await
    }

    pub async fn create(&self, new: &NewInstitution) -> Result<Institution, ApiError> {
        self.client.post("/institutions", new).await
    }

    pub async fn update(&self, institution: &Institution) -> Result<Institution, ApiError> {
        self.client
            .put(&format!("/institutions/{}", institution.id), institution)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/institutions/{}", id)).await
    }

    /// Remember `institution` as the session's current institution. The
    /// record is cleared automatically whenever the session is torn down.
    pub fn remember_current(&self, institution: &Institution) -> Result<(), ApiError> {
        let value = serde_json::to_value(institution)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        self.client.session().session().set_institution(&value);
        Ok(())
    }

    /// The session's current institution, if one was remembered.
    pub fn current(&self) -> Option<Institution> {
        let value = self.client.session().session().institution()?;
        serde_json::from_value(value).ok()
    }
}
