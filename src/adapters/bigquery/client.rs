//! BigQuery REST v2 client
//!
//! Implements [`Warehouse`] with three endpoints:
//! - `GET  projects/{p}/datasets/{d}/tables/{t}` (metadata)
//! - `POST projects/{p}/datasets/{d}/tables` (create)
//! - `POST projects/{p}/datasets/{d}/tables/{t}/insertAll` (streaming insert)
//!
//! Throttled (429), failed (5xx) and unreachable requests are retried with the
//! configured backoff. Inserts are safe to resend because every row carries an
//! `insertId` that BigQuery deduplicates on.

use super::models::{ErrorResponse, InsertAllRequest, InsertAllResponse, TableResource, TableResponse};
use super::warehouse::{InsertRow, TableDefinition, TableMetadata, TableRef, Warehouse};
use crate::adapters::gcp::AccessTokenProvider;
use crate::config::{BigQueryConfig, RetryConfig};
use crate::domain::{ExportError, Result, WarehouseError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// BigQuery client authenticated with Google access tokens
pub struct BigQueryClient {
    base_url: String,
    client: Client,
    auth: Arc<AccessTokenProvider>,
    retry: RetryConfig,
}

impl BigQueryClient {
    /// Creates a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BigQueryConfig, auth: Arc<AccessTokenProvider>) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                ExportError::Configuration(format!("Failed to build BigQuery HTTP client: {e}"))
            })?;

        Ok(Self::with_client(client, &config.base_url, auth).with_retry(config.retry.clone()))
    }

    /// Creates a client on top of an existing HTTP client
    pub fn with_client(client: Client, base_url: &str, auth: Arc<AccessTokenProvider>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            auth,
            retry: RetryConfig::default(),
        }
    }

    /// Replaces the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn tables_url(&self, table: &TableRef) -> String {
        format!(
            "{}/projects/{}/datasets/{}/tables",
            self.base_url, table.project_id, table.dataset_id
        )
    }

    fn table_url(&self, table: &TableRef) -> String {
        format!("{}/{}", self.tables_url(table), table.table_id)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let authorization = self.auth.authorization().await?;
        request
            .header("Authorization", authorization)
            .send()
            .await
            .map_err(|e| WarehouseError::ConnectionFailed(e.to_string()).into())
    }

    async fn retry_request<F, T, Fut>(&self, operation: &str, request: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            match request().await {
                Err(ExportError::Warehouse(e)) if e.is_retryable() => {
                    attempt += 1;
                    if attempt >= self.retry.max_retries {
                        return Err(e.into());
                    }
                    let delay_ms = self.retry.delay_ms(attempt);
                    tracing::warn!(
                        operation = operation,
                        attempt = attempt,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying BigQuery request after error"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                result => return result,
            }
        }
    }

    async fn table_metadata_once(&self, table: &TableRef) -> Result<TableMetadata> {
        let response = self.send(self.client.get(self.table_url(table))).await?;

        match response.status() {
            status if status.is_success() => {
                let body: TableResponse = response.json().await.map_err(|e| {
                    WarehouseError::InvalidResponse(format!("table metadata: {e}"))
                })?;
                Ok(body.into())
            }
            StatusCode::NOT_FOUND => Err(WarehouseError::TableNotFound(table.to_string()).into()),
            _ => Err(api_error(response).await),
        }
    }

    async fn create_table_once(&self, table: &TableRef, body: &TableResource<'_>) -> Result<()> {
        let response = self
            .send(self.client.post(self.tables_url(table)).json(body))
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(WarehouseError::TableAlreadyExists(table.to_string()).into()),
            _ => Err(api_error(response).await),
        }
    }

    async fn insert_rows_once(
        &self,
        table: &TableRef,
        request: &InsertAllRequest<'_>,
    ) -> Result<()> {
        let url = format!("{}/insertAll", self.table_url(table));
        let response = self.send(self.client.post(url).json(request)).await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: InsertAllResponse = response
            .json()
            .await
            .map_err(|e| WarehouseError::InvalidResponse(format!("insertAll: {e}")))?;

        if !body.insert_errors.is_empty() {
            return Err(WarehouseError::InsertFailed {
                table: table.to_string(),
                failed_rows: body.insert_errors.len(),
                message: body.summary(),
            }
            .into());
        }
        Ok(())
    }
}

/// Turns a non-success response into an API error, preferring the Google error message
async fn api_error(response: Response) -> ExportError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or(body);
    WarehouseError::Api { status, message }.into()
}

#[async_trait]
impl Warehouse for BigQueryClient {
    async fn table_metadata(&self, table: &TableRef) -> Result<TableMetadata> {
        self.retry_request("table metadata", || self.table_metadata_once(table))
            .await
    }

    async fn create_table(&self, table: &TableRef, definition: &TableDefinition) -> Result<()> {
        tracing::debug!(table = %table, "Creating table");

        let body = TableResource::new(table, definition);
        self.retry_request("create table", || self.create_table_once(table, &body))
            .await
    }

    async fn insert_rows(&self, table: &TableRef, rows: Vec<InsertRow>) -> Result<()> {
        let request = InsertAllRequest::new(&rows);
        self.retry_request("insertAll", || self.insert_rows_once(table, &request))
            .await?;

        tracing::debug!(table = %table, rows = rows.len(), "Rows inserted");
        Ok(())
    }
}
