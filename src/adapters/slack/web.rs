//! HTTP implementation of [`SlackApi`]
//!
//! Every call is a `GET {base_url}/{method}` with a bearer token. Slack reports
//! most failures inside a `200 OK` body as `{"ok": false, "error": "<code>"}`;
//! those are mapped to [`SlackError`]. Rate limits (429), server errors and
//! connection failures are retried with exponential backoff. A 429 waits for
//! its `Retry-After`, capped at `max_delay_ms`.

use super::api::{Page, SlackApi};
use crate::config::{RetryConfig, SecretString, SlackConfig};
use crate::domain::{Channel, ExportError, File, Result, SlackError, User, UserGroup};
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Error codes meaning the token itself is unusable
const AUTH_ERROR_CODES: &[&str] = &[
    "invalid_auth",
    "not_authed",
    "token_revoked",
    "token_expired",
    "account_inactive",
    "missing_scope",
    "no_permission",
];

#[derive(Debug, Deserialize)]
struct Status {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    needed: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponseMetadata {
    next_cursor: String,
}

#[derive(Debug, Deserialize)]
struct UsersList {
    #[serde(default)]
    members: Vec<User>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Deserialize)]
struct UserGroupsList {
    #[serde(default)]
    usergroups: Vec<UserGroup>,
}

#[derive(Debug, Deserialize)]
struct ConversationsList {
    #[serde(default)]
    channels: Vec<Channel>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Deserialize)]
struct ConversationMembers {
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Deserialize)]
struct FilesList {
    #[serde(default)]
    files: Vec<File>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

/// Slack Web API over HTTPS
pub struct SlackWebApi {
    base_url: String,
    client: Client,
    token: SecretString,
    page_size: u32,
    retry: RetryConfig,
}

impl SlackWebApi {
    /// Creates a client from configuration and a resolved token
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &SlackConfig, token: SecretString) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                ExportError::Configuration(format!("Failed to build Slack HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            token,
            page_size: config.page_size,
            retry: config.retry.clone(),
        })
    }

    /// Calls a Web API method, retrying transient failures
    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, String)]) -> Result<T> {
        let mut attempt = 0;

        loop {
            match self.call_once(method, params).await {
                Ok(result) => return Ok(result),
                Err(ExportError::Slack(e)) if e.is_retryable() => {
                    attempt += 1;
                    if attempt >= self.retry.max_retries {
                        return Err(e.into());
                    }

                    let delay_ms = match &e {
                        SlackError::RateLimited { retry_after_secs } => retry_after_secs
                            .saturating_mul(1000)
                            .min(self.retry.max_delay_ms),
                        _ => self.retry.delay_ms(attempt),
                    };

                    tracing::warn!(
                        method = method,
                        attempt = attempt,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying Slack request after error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn call_once<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        tracing::debug!(method = method, "Calling Slack Web API");

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.token.expose_secret().bearer())
            .query(params)
            .send()
            .await
            .map_err(|e| SlackError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(1);
            return Err(SlackError::RateLimited { retry_after_secs }.into());
        }
        if status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(SlackError::ServerError {
                status: status.as_u16(),
                message,
            }
            .into());
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SlackError::ClientError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| SlackError::ConnectionFailed(e.to_string()))?;
        decode(method, &body)
    }

    fn paged(&self, cursor: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", self.page_size.to_string())];
        if !cursor.is_empty() {
            params.push(("cursor", cursor.to_string()));
        }
        params
    }
}

/// Checks the `ok` envelope, then decodes the payload
fn decode<T: DeserializeOwned>(method: &str, body: &str) -> Result<T> {
    let status: Status = serde_json::from_str(body)
        .map_err(|e| SlackError::InvalidResponse(format!("{method}: {e}")))?;

    if !status.ok {
        let code = status.error.unwrap_or_else(|| "unknown_error".to_string());
        if AUTH_ERROR_CODES.contains(&code.as_str()) {
            let detail = match status.needed {
                Some(needed) => format!("{code} (needed: {needed})"),
                None => code,
            };
            return Err(SlackError::AuthenticationFailed(detail).into());
        }
        return Err(SlackError::Api {
            method: method.to_string(),
            code,
        }
        .into());
    }

    serde_json::from_str(body)
        .map_err(|e| SlackError::InvalidResponse(format!("{method}: {e}")).into())
}

#[async_trait]
impl SlackApi for SlackWebApi {
    async fn users_page(&self, cursor: &str) -> Result<Page<User>> {
        let body: UsersList = self.call("users.list", &self.paged(cursor)).await?;
        Ok(Page::new(body.members, body.response_metadata.next_cursor))
    }

    async fn user_groups(&self) -> Result<Vec<UserGroup>> {
        let params = [("include_users", "true".to_string())];
        let body: UserGroupsList = self.call("usergroups.list", &params).await?;
        Ok(body.usergroups)
    }

    async fn conversations_page(&self, cursor: &str) -> Result<Page<Channel>> {
        let mut params = self.paged(cursor);
        params.push(("types", "public_channel,private_channel".to_string()));
        params.push(("exclude_archived", "true".to_string()));
        let body: ConversationsList = self.call("conversations.list", &params).await?;
        Ok(Page::new(body.channels, body.response_metadata.next_cursor))
    }

    async fn conversation_members_page(
        &self,
        channel_id: &str,
        cursor: &str,
    ) -> Result<Page<String>> {
        let mut params = self.paged(cursor);
        params.push(("channel", channel_id.to_string()));
        let body: ConversationMembers = self.call("conversations.members", &params).await?;
        Ok(Page::new(body.members, body.response_metadata.next_cursor))
    }

    async fn files_page(&self, cursor: &str) -> Result<Page<File>> {
        let body: FilesList = self.call("files.list", &self.paged(cursor)).await?;
        Ok(Page::new(body.files, body.response_metadata.next_cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ok_payload() {
        let body = r#"{"ok":true,"members":["U1","U2"],"response_metadata":{"next_cursor":"dXNlcjpVMDYxTkZUVDI="}}"#;
        let decoded: ConversationMembers = decode("conversations.members", body).unwrap();
        assert_eq!(decoded.members, vec!["U1", "U2"]);
        assert_eq!(decoded.response_metadata.next_cursor, "dXNlcjpVMDYxTkZUVDI=");
    }

    #[test]
    fn test_decode_missing_metadata_means_last_page() {
        let decoded: FilesList = decode("files.list", r#"{"ok":true,"files":[]}"#).unwrap();
        assert!(decoded.files.is_empty());
        assert!(decoded.response_metadata.next_cursor.is_empty());
    }

    #[test]
    fn test_decode_auth_error() {
        let err = decode::<UsersList>("users.list", r#"{"ok":false,"error":"invalid_auth"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::Slack(SlackError::AuthenticationFailed(ref code)) if code == "invalid_auth"
        ));
    }

    #[test]
    fn test_decode_missing_scope_reports_needed() {
        let err = decode::<FilesList>(
            "files.list",
            r#"{"ok":false,"error":"missing_scope","needed":"files:read"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("needed: files:read"));
    }

    #[test]
    fn test_decode_api_error() {
        let err = decode::<ConversationsList>(
            "conversations.list",
            r#"{"ok":false,"error":"invalid_cursor"}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Slack API error in conversations.list: invalid_cursor"
        );
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode::<UsersList>("users.list", "<html>").unwrap_err();
        assert!(matches!(err, ExportError::Slack(SlackError::InvalidResponse(_))));
    }
}
