//! Export coordinator - main orchestrator for the export run
//!
//! A run walks five stages in order and stops at the first failure:
//!
//! 1. ensure tables: create every dated table, failing if one already exists
//! 2. export users
//! 3. export usergroups
//! 4. export channels: per page, insert the channels, then the members of
//!    each channel in page order
//! 5. export files
//!
//! The whole run is raced against the shutdown signal; when the signal wins,
//! the in-flight request is dropped and the run fails with
//! [`ExportError::Cancelled`]. Resolving the Slack token while the clients are
//! built is raced the same way.

use super::sink::{JobClient, JobConfig};
use super::summary::ExportSummary;
use crate::adapters::bigquery::BigQueryClient;
use crate::adapters::gcp::{AccessTokenProvider, SecretManagerClient};
use crate::adapters::slack::{SlackClient, SlackWebApi};
use crate::config::{SecretString, SlackExportConfig};
use crate::domain::ids::today_utc;
use crate::domain::{Channel, ExportError, Result, RunId, StageContext};
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Export coordinator
pub struct ExportCoordinator {
    slack: SlackClient,
    sink: JobClient,
    shutdown: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Creates a coordinator over already-built clients
    pub fn new(slack: SlackClient, sink: JobClient, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            slack,
            sink,
            shutdown,
        }
    }

    /// Builds the Slack and BigQuery clients described by `config`
    ///
    /// Resolves the Slack token (inline or from Secret Manager), picks the
    /// Google token source and generates a fresh run id.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be resolved or a client cannot be
    /// built, or [`ExportError::Cancelled`] when the shutdown signal fires
    /// while the token is being fetched.
    pub async fn from_config(
        config: &SlackExportConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.bigquery.timeout_seconds))
            .build()
            .map_err(|e| ExportError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        let google_auth = Arc::new(match &config.bigquery.access_token {
            Some(token) => AccessTokenProvider::fixed(token.clone()),
            None => AccessTokenProvider::metadata_server(http.clone(), &config.bigquery.metadata_url),
        });

        let slack_token = until_shutdown(
            &shutdown,
            resolve_slack_token(config, http, google_auth.clone()),
        )
        .await?;
        tracing::info!(base_url = %config.slack.base_url, "Init Slack client");
        let slack = SlackClient::new(Arc::new(SlackWebApi::new(&config.slack, slack_token)?));

        tracing::info!(project_id = %config.bigquery.project_id, "Init BigQuery client");
        let warehouse = Arc::new(BigQueryClient::new(&config.bigquery, google_auth)?);

        let job = JobConfig {
            project_id: config.bigquery.project_id.clone(),
            dataset: config.job.dataset.clone(),
            org: config.job.org.clone(),
            run_id: RunId::generate(),
            date: config.job.date.unwrap_or_else(today_utc),
            append_id_suffix: config.job.append_id_suffix,
        };

        Ok(Self::new(slack, JobClient::new(warehouse, job), shutdown))
    }

    /// Run id and date of this run
    pub fn job(&self) -> &JobConfig {
        self.sink.config()
    }

    /// Executes the run
    ///
    /// # Errors
    ///
    /// Returns the first stage failure, labelled with the stage path
    /// (e.g. `export channels: list channels: put channels: ...`), or
    /// [`ExportError::Cancelled`] when the shutdown signal fires first.
    pub async fn run(&self) -> Result<ExportSummary> {
        let start = Instant::now();
        let job = self.sink.config();
        tracing::info!(
            run_id = %job.run_id,
            date = %job.date,
            dataset = %job.dataset,
            org = %job.org,
            "Starting export"
        );

        if let Err(e) = until_shutdown(&self.shutdown, self.run_stages()).await {
            if e.is_cancelled() {
                tracing::warn!(run_id = %job.run_id, "Shutdown signal received, abandoning run");
            }
            return Err(e);
        }

        let summary = ExportSummary::new(job.run_id, job.date, self.sink.stats(), start.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    async fn run_stages(&self) -> Result<()> {
        self.sink.ensure_tables().await?;
        self.export_users().await.stage("export users")?;
        self.export_user_groups().await.stage("export usergroups")?;
        self.export_channels().await.stage("export channels")?;
        self.export_files().await.stage("export files")?;
        Ok(())
    }

    async fn export_users(&self) -> Result<()> {
        tracing::info!("Exporting users");
        self.slack
            .list_users(|users| async move {
                self.sink.put_users(&users).await?;
                Ok(())
            })
            .await
    }

    async fn export_user_groups(&self) -> Result<()> {
        tracing::info!("Exporting usergroups");
        self.slack
            .list_user_groups(|groups| async move {
                self.sink.put_user_groups(&groups).await?;
                Ok(())
            })
            .await
    }

    async fn export_channels(&self) -> Result<()> {
        tracing::info!("Exporting channels");
        self.slack
            .list_channels(|channels| async move {
                self.sink.put_channels(&channels).await?;
                for channel in &channels {
                    self.export_channel_members(channel)
                        .await
                        .stage("export channelmembers")?;
                }
                Ok(())
            })
            .await
    }

    async fn export_channel_members(&self, channel: &Channel) -> Result<()> {
        tracing::debug!(channel_id = %channel.id, channel = %channel.name, "Exporting channel members");
        self.slack
            .list_channel_members(channel, |members| async move {
                self.sink.put_channel_members(channel, &members).await?;
                Ok(())
            })
            .await
    }

    async fn export_files(&self) -> Result<()> {
        tracing::info!("Exporting files");
        self.slack
            .list_files(|files| async move {
                self.sink.put_files(&files).await?;
                Ok(())
            })
            .await
    }
}

/// Resolves once the signal is raised. Never resolves if the sender is gone.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Drives `future` unless the shutdown signal is raised first
async fn until_shutdown<T>(
    shutdown: &watch::Receiver<bool>,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    let mut shutdown = shutdown.clone();
    tokio::select! {
        biased;
        _ = wait_for_shutdown(&mut shutdown) => Err(ExportError::Cancelled),
        result = future => result,
    }
}

async fn resolve_slack_token(
    config: &SlackExportConfig,
    http: Client,
    google_auth: Arc<AccessTokenProvider>,
) -> Result<SecretString> {
    if let Some(token) = &config.slack.token {
        return Ok(token.clone());
    }
    let name = config.slack.api_key_secret.as_deref().ok_or_else(|| {
        ExportError::Configuration("one of slack.token or slack.api_key_secret must be set".to_string())
    })?;
    SecretManagerClient::new(http, &config.secret_manager.base_url, google_auth)
        .access(name)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_for_shutdown_resolves_on_signal() {
        let (tx, mut rx) = watch::channel(false);
        let waiter = tokio::spawn(async move { wait_for_shutdown(&mut rx).await });
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_shutdown_pending_when_sender_dropped() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        let result =
            tokio::time::timeout(Duration::from_millis(50), wait_for_shutdown(&mut rx)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_until_shutdown_passes_result_through() {
        let (_tx, rx) = watch::channel(false);
        let value = until_shutdown(&rx, async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_token_fetch_is_cancelled_by_shutdown() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut config = SlackExportConfig {
            application: Default::default(),
            slack: Default::default(),
            bigquery: Default::default(),
            secret_manager: Default::default(),
            job: Default::default(),
            logging: Default::default(),
        };
        config.slack.api_key_secret =
            Some("projects/acme/secrets/slack-token/versions/latest".to_string());
        config.bigquery.access_token = Some(crate::config::secret_string("ya29.test".to_string()));
        config.secret_manager.base_url = format!("http://{addr}");

        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(true);
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            ExportCoordinator::from_config(&config, rx),
        )
        .await
        .unwrap();

        assert!(result.err().is_some_and(|e| e.is_cancelled()));
        server.abort();
    }
}
