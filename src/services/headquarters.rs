//! CRUD operations for headquarters (campus sites).

use crate::api::{ApiClient, ApiError};
use crate::models::{Headquarters, NewHeadquarters};

#[derive(Clone)]
pub struct HeadquartersService {
    client: ApiClient,
}

impl HeadquartersService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_for_institution(
        &self,
        institution_id: i64,
    ) -> Result<Vec<Headquarters>, ApiError> {
        self.client
            .get(&format!("/institutions/{}/headquarters", institution_id))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Headquarters, ApiError> {
        self.client.get(&format!("/headquarters/{}", id)).await
    }

    pub async fn create(&self, new: &NewHeadquarters) -> Result<Headquarters, ApiError> {
        self.client.post("/headquarters", new).await
    }

    pub async fn update(&self, headquarters: &Headquarters) -> Result<Headquarters, ApiError> {
        self.client
            .put(&format!("/headquarters/{}", headquarters.id), headquarters)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/headquarters/{}", id)).await
    }
}
