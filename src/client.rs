// 📡 HTTP Contract API Client - talks to a running contracts-server
//
// Status codes and reason codes from the response envelope are mapped back
// onto DispatchError so callers can't tell it apart from the local API.

use crate::api::{ContractApi, DispatchResult};
use crate::config::Config;
use crate::contract::{Contract, ContractField, ContractId, FieldValue, NewContract};
use crate::error::DispatchError;
use crate::wire::{ApiResponse, ChangeRequest, DeleteRequest};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// ContractApi over the REST surface
#[derive(Debug, Clone)]
pub struct HttpContractApi {
    client: Client,
    base_url: String,
}

impl HttpContractApi {
    /// `base_url` without trailing slash, e.g. `http://localhost:8080`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Client for `CONTRACTS_API_URL`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone())
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpContractApi { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(e: reqwest::Error) -> DispatchError {
    DispatchError::Transport(e.to_string())
}

/// Unwrap the envelope, mapping error statuses for contract `id`
async fn read_body<T: DeserializeOwned>(response: Response, id: Option<ContractId>) -> DispatchResult<T> {
    let status = response.status();

    if status.is_success() {
        let envelope: ApiResponse<T> = response.json().await.map_err(transport)?;
        return Ok(envelope.body);
    }

    let message = response
        .json::<ApiResponse<serde_json::Value>>()
        .await
        .map(|envelope| format!("{} ({})", envelope.head.message, envelope.head.reason_code))
        .unwrap_or_else(|_| status.to_string());

    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(DispatchError::NotFound(id)),
        (StatusCode::BAD_REQUEST, _) | (StatusCode::CONFLICT, _) => Err(DispatchError::Rejected(message)),
        _ => Err(DispatchError::Transport(message)),
    }
}

#[async_trait]
impl ContractApi for HttpContractApi {
    async fn list(&self) -> DispatchResult<Vec<Contract>> {
        let response = self.client.get(self.url("/all")).send().await.map_err(transport)?;
        read_body(response, None).await
    }

    async fn get(&self, id: ContractId) -> DispatchResult<Contract> {
        let response = self
            .client
            .get(self.url(&format!("/get/{}", id)))
            .send()
            .await
            .map_err(transport)?;
        read_body::<Option<Contract>>(response, Some(id))
            .await?
            .ok_or(DispatchError::NotFound(id))
    }

    async fn create(&self, contract: NewContract) -> DispatchResult<Contract> {
        let response = self
            .client
            .post(self.url("/add"))
            .json(&contract)
            .send()
            .await
            .map_err(transport)?;
        read_body::<Option<Contract>>(response, None)
            .await?
            .ok_or_else(|| DispatchError::Transport("server returned no contract".to_string()))
    }

    async fn delete(&self, id: ContractId) -> DispatchResult<()> {
        let response = self
            .client
            .post(self.url("/delete"))
            .json(&DeleteRequest { id, name: None })
            .send()
            .await
            .map_err(transport)?;
        read_body::<serde_json::Value>(response, Some(id)).await.map(|_| ())
    }

    async fn update_field(
        &self,
        id: ContractId,
        field: ContractField,
        value: FieldValue,
    ) -> DispatchResult<Contract> {
        let request = ChangeRequest {
            key: field.as_str().to_string(),
            value: serde_json::to_value(&value).map_err(|e| DispatchError::Rejected(e.to_string()))?,
        };
        debug!(id, %field, %value, "sending field update");

        let response = self
            .client
            .patch(self.url(&format!("/change/{}", id)))
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        read_body::<Option<Contract>>(response, Some(id))
            .await?
            .ok_or(DispatchError::NotFound(id))
    }
}
