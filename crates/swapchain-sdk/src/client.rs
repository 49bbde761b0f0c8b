//! Swapchain client implementation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swapchain_core::DraftField;
use swapchain_flow::ProposalView;
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};
use crate::stream::ProposalStream;

/// Client for driving proposals on a Swapchain node.
#[derive(Clone)]
pub struct SwapchainClient {
    /// Base URL of the node.
    base_url: String,

    /// HTTP client.
    http_client: reqwest::Client,
}

/// A proposal as returned by the node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub view: ProposalView,
}

/// Node health.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions: usize,
}

#[derive(Debug, Serialize)]
struct UpdateFieldRequest<'a> {
    field: &'a str,
    value: &'a str,
}

impl SwapchainClient {
    /// Connect to a node, checking its health endpoint.
    pub async fn connect(url: &str) -> ClientResult<Self> {
        let client = Self {
            base_url: url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        };
        client.health().await?;
        Ok(client)
    }

    /// Get node health.
    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let response = self
            .http_client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        Self::decode(response, None).await
    }

    /// Start a new proposal with a default draft.
    pub async fn create_proposal(&self) -> ClientResult<ProposalResponse> {
        let response = self
            .http_client
            .post(format!("{}/api/v1/proposals", self.base_url))
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        Self::decode(response, None).await
    }

    /// Get a proposal.
    pub async fn get_proposal(&self, id: Uuid) -> ClientResult<ProposalResponse> {
        let response = self
            .http_client
            .get(format!("{}/api/v1/proposals/{}", self.base_url, id))
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        Self::decode(response, Some(id)).await
    }

    /// List all proposals on the node.
    pub async fn list_proposals(&self) -> ClientResult<Vec<ProposalResponse>> {
        let response = self
            .http_client
            .get(format!("{}/api/v1/proposals", self.base_url))
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        Self::decode(response, None).await
    }

    /// Set one field from raw input.
    pub async fn update_field(
        &self,
        id: Uuid,
        field: DraftField,
        value: &str,
    ) -> ClientResult<ProposalResponse> {
        let response = self
            .http_client
            .patch(format!("{}/api/v1/proposals/{}/fields", self.base_url, id))
            .json(&UpdateFieldRequest {
                field: field.as_str(),
                value,
            })
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        Self::decode(response, Some(id)).await
    }

    /// Submit the draft. An invalid draft yields [`ClientError::Rejected`].
    pub async fn submit(&self, id: Uuid) -> ClientResult<ProposalResponse> {
        let response = self
            .http_client
            .post(format!("{}/api/v1/proposals/{}/submit", self.base_url, id))
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        Self::decode(response, Some(id)).await
    }

    /// Submit and follow the proposal until it finishes.
    pub async fn submit_and_watch(&self, id: Uuid) -> ClientResult<ProposalStream> {
        let stream = self.watch(id).await?;
        self.submit(id).await?;
        Ok(stream)
    }

    /// Open the lifecycle stream of a proposal.
    pub async fn watch(&self, id: Uuid) -> ClientResult<ProposalStream> {
        ProposalStream::connect(&self.ws_url(id), id).await
    }

    /// Discard a proposal.
    pub async fn delete_proposal(&self, id: Uuid) -> ClientResult<()> {
        let response = self
            .http_client
            .delete(format!("{}/api/v1/proposals/{}", self.base_url, id))
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status.as_u16(), Some(id), message));
        }
        Ok(())
    }

    fn ws_url(&self, id: Uuid) -> String {
        format!(
            "{}/ws/proposals/{}",
            self.base_url
                .replacen("http://", "ws://", 1)
                .replacen("https://", "wss://", 1),
            id
        )
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        id: Option<Uuid>,
    ) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status.as_u16(), id, message));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> SwapchainClient {
        SwapchainClient {
            base_url: url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    #[test]
    fn test_ws_url() {
        let id = Uuid::nil();
        assert_eq!(
            client("http://localhost:3000/").ws_url(id),
            format!("ws://localhost:3000/ws/proposals/{}", id)
        );
        assert_eq!(
            client("https://node.example").ws_url(id),
            format!("wss://node.example/ws/proposals/{}", id)
        );
    }

    #[test]
    fn test_decode_proposal_response() {
        let body = serde_json::json!({
            "id": "00000000-0000-0000-0000-000000000000",
            "createdAt": "2024-01-01T00:00:00Z",
            "title": "Propose a new Atomic Cross Chain Swap",
            "state": "error",
            "message": "Rate is less than 0",
            "draftVersion": 2,
            "screen": { "kind": "success" },
            "footer": { "kind": "error_message", "text": "Rate is less than 0" }
        });

        let response: ProposalResponse = serde_json::from_value(body).unwrap();

        assert_eq!(response.view.state.message(), Some("Rate is less than 0"));
        assert_eq!(response.view.draft_version, 2);
    }
}
