use crate::models::{ErrorRecord, Profile, Revision};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Revision conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Interface to the profile document store.
///
/// Handlers and the vote recorder take this explicitly instead of reaching
/// for an ambient database handle, so tests can substitute an in-memory
/// implementation.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch every profile document
    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError>;

    /// Fetch a single profile and its current revision token
    async fn get_profile(&self, id: &str) -> Result<(Profile, Revision), StoreError>;

    /// Create a new profile document; the store assigns the id
    async fn create_profile(&self, profile: &Profile) -> Result<Profile, StoreError>;

    /// Conditionally write the vote tally of a profile.
    ///
    /// The write only applies if the document is still at `revision`;
    /// otherwise it fails with `StoreError::Conflict` and nothing changes.
    async fn update_votes_guarded(
        &self,
        id: &str,
        revision: &Revision,
        votes: u64,
        voted_by: &[String],
    ) -> Result<(), StoreError>;

    /// Append an audit record to the "errors" collection
    async fn record_error(&self, record: &ErrorRecord) -> Result<(), StoreError>;
}

/// Collection IDs in the document store
#[derive(Debug, Clone)]
pub struct StoreCollections {
    pub profiles: String,
    pub errors: String,
}

/// HTTP client for the hosted document database
pub struct DocumentStoreClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: StoreCollections,
}

impl DocumentStoreClient {
    /// Create a new document store client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: StoreCollections,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), urlencoding::encode(id))
    }

    fn map_error_status(status: StatusCode, context: String) -> StoreError {
        match status {
            StatusCode::NOT_FOUND => StoreError::NotFound(context),
            StatusCode::PRECONDITION_FAILED => StoreError::Conflict(context),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized,
            _ => StoreError::ApiError(format!("{}: {}", context, status)),
        }
    }
}

#[async_trait]
impl ProfileStore for DocumentStoreClient {
    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let url = self.collection_url(&self.collections.profiles);

        tracing::debug!("Listing profiles from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .header("X-Project", &self.project_id)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error_status(
                response.status(),
                "Failed to list profiles".to_string(),
            ));
        }

        let json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| StoreError::InvalidResponse("Missing documents array".into()))?;

        let profiles: Vec<Profile> = documents
            .iter()
            .filter_map(|doc| serde_json::from_value(doc.clone()).ok())
            .collect();

        tracing::debug!("Listed {} profiles (total: {})", profiles.len(), total);

        Ok(profiles)
    }

    async fn get_profile(&self, id: &str) -> Result<(Profile, Revision), StoreError> {
        let url = self.document_url(&self.collections.profiles, id);

        tracing::debug!("Fetching profile: {}", id);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .header("X-Project", &self.project_id)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error_status(
                response.status(),
                format!("Profile {} not found", id),
            ));
        }

        let json: Value = response.json().await?;

        let revision = json
            .get("revision")
            .and_then(|r| r.as_str())
            .map(|r| Revision(r.to_string()))
            .ok_or_else(|| StoreError::InvalidResponse("Missing revision token".into()))?;

        let profile = serde_json::from_value(json)
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse profile: {}", e)))?;

        Ok((profile, revision))
    }

    async fn create_profile(&self, profile: &Profile) -> Result<Profile, StoreError> {
        let url = self.collection_url(&self.collections.profiles);

        let mut payload = serde_json::to_value(profile)
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to encode profile: {}", e)))?;
        // The store assigns the document id
        if let Some(obj) = payload.as_object_mut() {
            obj.remove("id");
        }

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .header("X-Project", &self.project_id)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error_status(
                response.status(),
                "Failed to create profile".to_string(),
            ));
        }

        let json: Value = response.json().await?;

        let created: Profile = serde_json::from_value(json).map_err(|e| {
            StoreError::InvalidResponse(format!("Failed to parse created profile: {}", e))
        })?;

        tracing::debug!("Created profile {} ({})", created.id, created.name);

        Ok(created)
    }

    async fn update_votes_guarded(
        &self,
        id: &str,
        revision: &Revision,
        votes: u64,
        voted_by: &[String],
    ) -> Result<(), StoreError> {
        let url = self.document_url(&self.collections.profiles, id);

        let payload = serde_json::json!({
            "votes": votes,
            "votedBy": voted_by,
        });

        let response = self
            .client
            .patch(&url)
            .header("X-Api-Key", &self.api_key)
            .header("X-Project", &self.project_id)
            .header("If-Match", revision.as_str())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error_status(
                response.status(),
                format!("Guarded update of profile {} failed", id),
            ));
        }

        tracing::debug!("Updated profile {} to {} votes", id, votes);

        Ok(())
    }

    async fn record_error(&self, record: &ErrorRecord) -> Result<(), StoreError> {
        let url = self.collection_url(&self.collections.errors);

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .header("X-Project", &self.project_id)
            .json(record)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error_status(
                response.status(),
                "Failed to record error".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: String) -> DocumentStoreClient {
        DocumentStoreClient::new(
            base_url,
            "test_key".to_string(),
            "test_project".to_string(),
            "test_db".to_string(),
            StoreCollections {
                profiles: "profiles".to_string(),
                errors: "errors".to_string(),
            },
        )
    }

    fn profile_json(id: &str, votes: u64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "revision": "rev-1",
            "name": "Test",
            "batchYear": "2024",
            "gender": "Female",
            "bio": "hi",
            "photo": null,
            "votes": votes,
            "votedBy": [],
            "createdAt": "2024-01-01T00:00:00Z",
        })
    }

    #[tokio::test]
    async fn test_get_profile_parses_revision() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/databases/test_db/collections/profiles/documents/p1",
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(profile_json("p1", 3).to_string())
            .create_async()
            .await;

        let client = test_client(server.url());
        let (profile, revision) = client.get_profile("p1").await.unwrap();

        assert_eq!(profile.id, "p1");
        assert_eq!(profile.votes, 3);
        assert_eq!(revision, Revision("rev-1".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_profile_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                "/databases/test_db/collections/profiles/documents/missing",
            )
            .with_status(404)
            .create_async()
            .await;

        let client = test_client(server.url());
        let result = client.get_profile("missing").await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_guarded_update_conflict() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "PATCH",
                "/databases/test_db/collections/profiles/documents/p1",
            )
            .match_header("if-match", "stale-rev")
            .with_status(412)
            .create_async()
            .await;

        let client = test_client(server.url());
        let result = client
            .update_votes_guarded(
                "p1",
                &Revision("stale-rev".to_string()),
                1,
                &["a@x.com".to_string()],
            )
            .await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_list_profiles() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/databases/test_db/collections/profiles/documents")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "total": 2,
                    "documents": [profile_json("p1", 0), profile_json("p2", 4)],
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = test_client(server.url());
        let profiles = client.list_profiles().await.unwrap();

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[1].votes, 4);
    }
}
