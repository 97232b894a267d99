//! Google OAuth access tokens
//!
//! Tokens come either from configuration (useful locally and in tests) or from
//! the compute metadata server available on GCE, Cloud Run and GKE. Metadata
//! tokens are cached and refreshed a minute before they expire.

use crate::config::{secret_string, SecretString};
use crate::domain::{ExportError, Result};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const METADATA_TOKEN_PATH: &str = "/instance/service-accounts/default/token";
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: SecretString,
    refresh_at: Instant,
}

enum TokenSource {
    Static(SecretString),
    MetadataServer { client: Client, url: String },
}

/// Supplies bearer tokens for Google REST APIs
pub struct AccessTokenProvider {
    source: TokenSource,
    cache: Mutex<Option<CachedToken>>,
}

impl AccessTokenProvider {
    /// A provider that always returns the given token
    pub fn fixed(token: SecretString) -> Self {
        Self {
            source: TokenSource::Static(token),
            cache: Mutex::new(None),
        }
    }

    /// A provider backed by the metadata server rooted at `metadata_url`
    /// (e.g. `http://metadata.google.internal/computeMetadata/v1`)
    pub fn metadata_server(client: Client, metadata_url: &str) -> Self {
        Self {
            source: TokenSource::MetadataServer {
                client,
                url: format!("{}{}", metadata_url.trim_end_matches('/'), METADATA_TOKEN_PATH),
            },
            cache: Mutex::new(None),
        }
    }

    /// Returns the `Authorization` header value
    pub async fn authorization(&self) -> Result<String> {
        let token = self.token().await?;
        let header = token.expose_secret().bearer();
        Ok(header)
    }

    /// Returns a valid access token, fetching a new one when needed
    pub async fn token(&self) -> Result<SecretString> {
        let (client, url) = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::MetadataServer { client, url } => (client, url),
        };

        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if Instant::now() < cached.refresh_at {
                return Ok(cached.token.clone());
            }
        }

        tracing::debug!(url = %url, "Fetching access token from metadata server");
        let response = client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| {
                ExportError::Authentication(format!("metadata server unreachable: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::Authentication(format!(
                "metadata server returned {status}: {body}"
            )));
        }

        let fetched: MetadataToken = response.json().await.map_err(|e| {
            ExportError::Authentication(format!("invalid metadata token response: {e}"))
        })?;

        let lifetime = Duration::from_secs(fetched.expires_in);
        let token = secret_string(fetched.access_token);
        *cache = Some(CachedToken {
            token: token.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(REFRESH_MARGIN),
        });

        tracing::debug!(expires_in = fetched.expires_in, "Access token refreshed");
        Ok(token)
    }
}
