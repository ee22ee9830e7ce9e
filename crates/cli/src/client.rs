//! API client for communicating with the sizing service

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sizing_lib::{
    catalog::{LoadBalancerSpecs, RoleSpecs},
    vm::HaPattern,
    AppTier, LoadBalancerOption, ServerRole, Technology,
};
use thiserror::Error;
use url::Url;

/// Error reported by the sizing service
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API error ({status}): {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
        field: Option<String>,
    },
}

/// API client for the sizing service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request with query parameters
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let mut url = self.base_url.join(path).context("Invalid path")?;
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let (message, field) = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => (err.error, err.field),
                Err(_) => (body, None),
            };
            return Err(ClientError::Api {
                status,
                message,
                field,
            }
            .into());
        }

        response.json().await.context("Failed to parse response")
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePreview {
    pub role: ServerRole,
    pub tier: AppTier,
    pub technology: Technology,
    #[serde(flatten)]
    pub specs: RoleSpecs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaPreview {
    pub pattern: HaPattern,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadBalancerPreview {
    pub option: LoadBalancerOption,
    #[serde(flatten)]
    pub specs: LoadBalancerSpecs,
}
