use crate::application::ports::remote_store::{RemoteError, RemoteStore};
use crate::domain::value_objects::{EntityId, RemotePayload};
use crate::shared::config::RemoteConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Remote store over a PostgREST-style row API: one route per entity table,
/// id-keyed upserts, and a structured "unknown column" error body that the
/// schema drift adapter can act on.
pub struct RestRemoteStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestRemoteStore {
    pub fn new(config: &RemoteConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| AppError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}")),
            None => request,
        }
    }

    fn classify_failure(status: StatusCode, body: String) -> RemoteError {
        if let Some(column) = parse_unknown_column(&body) {
            return RemoteError::UnknownColumn(column);
        }
        if status.is_server_error() {
            return RemoteError::Unavailable(format!("{status}: {body}"));
        }
        RemoteError::Rejected(format!("{status}: {body}"))
    }

    fn transport_error(err: reqwest::Error) -> RemoteError {
        RemoteError::Unavailable(err.to_string())
    }
}

/// Pulls the column name out of an unknown-column error body. Handles both
/// the structured JSON form (`code` PGRST204) and a bare message.
fn parse_unknown_column(body: &str) -> Option<String> {
    let message = match serde_json::from_str::<Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    };

    let marker = "Could not find the '";
    let start = message.find(marker)? + marker.len();
    let rest = &message[start..];
    let column = rest.split('\'').next()?;
    if column.is_empty() || !rest.contains("column") {
        return None;
    }
    Some(column.to_string())
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn upsert(&self, table: &str, row: &RemotePayload) -> Result<(), RemoteError> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&row.as_json());

        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(Self::classify_failure(status, body))
    }

    async fn delete(&self, table: &str, id: &EntityId) -> Result<(), RemoteError> {
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))]);

        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        // A row already gone is a success for an idempotent delete.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(Self::classify_failure(status, body))
    }

    async fn select_all(&self, table: &str) -> Result<Vec<RemotePayload>, RemoteError> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*")]);

        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_failure(status, body));
        }

        let rows: Vec<Value> = response.json().await.map_err(Self::transport_error)?;
        debug!(table, count = rows.len(), "Fetched remote rows");
        rows.into_iter()
            .map(|row| RemotePayload::new(row).map_err(RemoteError::Rejected))
            .collect()
    }

    async fn select_by_id(
        &self,
        table: &str,
        id: &EntityId,
    ) -> Result<Option<RemotePayload>, RemoteError> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_string())]);

        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_failure(status, body));
        }

        let mut rows: Vec<Value> = response.json().await.map_err(Self::transport_error)?;
        if rows.is_empty() {
            return Ok(None);
        }
        RemotePayload::new(rows.remove(0))
            .map(Some)
            .map_err(RemoteError::Rejected)
    }
}
