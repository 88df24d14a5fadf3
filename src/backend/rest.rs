//! PostgREST/RPC backend client.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::types::{Account, BackendConfig, Habit, PartnerRow, Relationship};

use super::traits::HabitBackend;

/// HTTP client for the hosted backend's REST and RPC surface.
///
/// # Example
///
/// ```rust,no_run
/// use habitlevelup_client::{BackendConfig, RestBackend};
///
/// let backend = RestBackend::new(BackendConfig {
///     base_url: "https://project.supabase.co".into(),
///     api_key: "anon-key".into(),
///     ..Default::default()
/// });
/// ```
#[derive(Clone)]
pub struct RestBackend {
    config: BackendConfig,
    client: Client,
}

impl RestBackend {
    /// Create a new backend client. Both credential headers are attached to
    /// every request as opaque pass-through values.
    pub fn new(config: BackendConfig) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "apikey",
            header::HeaderValue::from_str(&config.api_key).expect("Invalid API key"),
        );
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.bearer()))
                .expect("Invalid bearer token"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self { config, client }
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound("resource not found".to_string()));
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Server { status, message });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl HabitBackend for RestBackend {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let url = format!("{}/accounts?select=*", self.config.rest_url());
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    async fn find_account(&self, account_id: Uuid) -> Result<Option<Account>> {
        let url = format!(
            "{}/accounts?id=eq.{}&select=*",
            self.config.rest_url(),
            urlencoding::encode(&account_id.to_string())
        );
        let response = self.client.get(&url).send().await?;
        let mut rows: Vec<Account> = self.handle_response(response).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn habits_of(&self, owner_id: Uuid) -> Result<Vec<Habit>> {
        let url = format!(
            "{}/habits?user_id=eq.{}&select=*&order=created_at.asc",
            self.config.rest_url(),
            urlencoding::encode(&owner_id.to_string())
        );
        debug!(%owner_id, "fetching habits");
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    async fn partner_rows(&self, user_id: Uuid) -> Result<Vec<PartnerRow>> {
        let url = format!("{}/rpc/get_partners", self.config.rest_url());
        debug!(%user_id, "calling get_partners RPC");
        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&json!({ "p_user_id": user_id }))
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn list_relationships(&self) -> Result<Vec<Relationship>> {
        let url = format!(
            "{}/relationships?select=*&order=created_at.asc",
            self.config.rest_url()
        );
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }
}
