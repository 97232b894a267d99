//! Warehouse sink
//!
//! [`JobClient`] creates the dated tables of a run and writes mapped Slack
//! records into them, one streaming insert per batch.

use super::summary::WriteStats;
use crate::adapters::bigquery::{InsertRow, TableDefinition, TableRef, Warehouse};
use crate::core::tables::{
    ChannelMembersRow, ChannelsRow, FilesRow, Row, TableKind, UserGroupsRow, UsersRow,
};
use crate::domain::{
    Channel, ChannelMember, ExportError, File, Result, RunId, StageContext, User, UserGroup,
    WarehouseError,
};
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

/// Where and under which identity a run writes
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub project_id: String,
    pub dataset: String,
    pub org: String,
    pub run_id: RunId,
    pub date: NaiveDate,
    pub append_id_suffix: bool,
}

impl JobConfig {
    /// Table name of `kind` for this run: `<entity>_<YYYYMMDD>[_<run id>]`
    pub fn table_id(&self, kind: TableKind) -> String {
        let table_id = kind.table_id(self.date);
        if self.append_id_suffix {
            format!("{table_id}_{}", self.run_id)
        } else {
            table_id
        }
    }

    pub fn table_ref(&self, kind: TableKind) -> TableRef {
        TableRef::new(&self.project_id, &self.dataset, self.table_id(kind))
    }
}

/// Writes one run's rows into the warehouse
pub struct JobClient {
    warehouse: Arc<dyn Warehouse>,
    config: JobConfig,
    stats: Mutex<WriteStats>,
}

impl JobClient {
    pub fn new(warehouse: Arc<dyn Warehouse>, config: JobConfig) -> Self {
        Self {
            warehouse,
            config,
            stats: Mutex::new(WriteStats::default()),
        }
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> WriteStats {
        self.stats.lock().map(|s| *s).unwrap_or_default()
    }

    fn record(&self, update: impl FnOnce(&mut WriteStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            update(&mut stats);
        }
    }

    /// Creates every table of the run, in [`TableKind::ALL`] order
    ///
    /// # Errors
    ///
    /// Fails on the first table that already exists or cannot be checked or
    /// created. Tables created before the failure are left in place.
    pub async fn ensure_tables(&self) -> Result<()> {
        tracing::info!(
            dataset = %self.config.dataset,
            date = %self.config.date,
            "Ensuring tables"
        );
        for kind in TableKind::ALL {
            let table = self.config.table_ref(kind);
            self.create_table(kind, &table)
                .await
                .stage(&format!("create table {}", table.table_id))?;
        }
        Ok(())
    }

    async fn create_table(&self, kind: TableKind, table: &TableRef) -> Result<()> {
        match self.warehouse.table_metadata(table).await {
            Ok(existing) => {
                tracing::error!(
                    table = %table,
                    num_rows = ?existing.num_rows,
                    creation_time = ?existing.creation_time,
                    "Table already exists"
                );
                return Err(WarehouseError::TableAlreadyExists(table.to_string()).into());
            }
            Err(ExportError::Warehouse(WarehouseError::TableNotFound(_))) => {}
            Err(e) => return Err(e),
        }

        tracing::info!(table = %table, "Creating table");
        let definition = TableDefinition {
            description: kind.description().to_string(),
            schema: kind.schema(),
        };
        self.warehouse.create_table(table, &definition).await?;
        self.record(|s| s.tables_created += 1);
        Ok(())
    }

    /// Inserts mapped rows with one call. An empty batch makes no call.
    async fn put<R: Row>(&self, rows: Vec<R>) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let run_id = self.config.run_id;
        let mut batch = Vec::with_capacity(rows.len());
        for row in &rows {
            batch.push(InsertRow {
                insert_id: row.insert_id(&run_id),
                json: serde_json::to_value(row)?,
            });
        }

        let count = batch.len();
        let table = self.config.table_ref(R::KIND);
        tracing::debug!(table = %table, count = count, "Inserting {}", R::KIND);
        self.warehouse.insert_rows(&table, batch).await?;

        self.record(|s| {
            s.insert_calls += 1;
            s.rows.add(R::KIND, count);
        });
        Ok(count)
    }

    /// Writes users into `users_<date>`
    pub async fn put_users(&self, users: &[User]) -> Result<usize> {
        let rows = users
            .iter()
            .map(|u| UsersRow::from_source(Some(u)).with_org(&self.config.org))
            .collect();
        self.put::<UsersRow>(rows).await.stage("put users")
    }

    /// Writes user groups into `usergroups_<date>`
    pub async fn put_user_groups(&self, groups: &[UserGroup]) -> Result<usize> {
        let rows = groups
            .iter()
            .map(|g| UserGroupsRow::from_source(Some(g)).with_org(&self.config.org))
            .collect();
        self.put::<UserGroupsRow>(rows).await.stage("put usergroups")
    }

    /// Writes channels into `channels_<date>`
    pub async fn put_channels(&self, channels: &[Channel]) -> Result<usize> {
        let rows = channels
            .iter()
            .map(|c| ChannelsRow::from_source(Some(c)).with_org(&self.config.org))
            .collect();
        self.put::<ChannelsRow>(rows).await.stage("put channels")
    }

    /// Writes one row per member of `channel` into `channel_members_<date>`
    pub async fn put_channel_members(&self, channel: &Channel, members: &[String]) -> Result<usize> {
        let rows = members
            .iter()
            .map(|m| ChannelMembersRow::from_source(Some(&ChannelMember::new(channel, m.as_str()))))
            .collect();
        self.put::<ChannelMembersRow>(rows)
            .await
            .stage("put channelmembers")
    }

    /// Writes files into `files_<date>`
    pub async fn put_files(&self, files: &[File]) -> Result<usize> {
        let rows = files.iter().map(|f| FilesRow::from_source(Some(f))).collect();
        self.put::<FilesRow>(rows).await.stage("put files")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::bigquery::TableMetadata;
    use async_trait::async_trait;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls; every table reports `existing` metadata when set
    #[derive(Default)]
    struct CountingWarehouse {
        existing: Option<TableMetadata>,
        creates: AtomicUsize,
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl Warehouse for CountingWarehouse {
        async fn table_metadata(&self, table: &TableRef) -> Result<TableMetadata> {
            self.existing
                .clone()
                .ok_or_else(|| WarehouseError::TableNotFound(table.to_string()).into())
        }

        async fn create_table(
            &self,
            _table: &TableRef,
            _definition: &TableDefinition,
        ) -> Result<()> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn insert_rows(&self, _table: &TableRef, _rows: Vec<InsertRow>) -> Result<()> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn config(append_id_suffix: bool) -> JobConfig {
        JobConfig {
            project_id: "acme-data".to_string(),
            dataset: "slack".to_string(),
            org: "acme".to_string(),
            run_id: RunId::from_str("00000000-0000-4000-8000-000000000001").unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            append_id_suffix,
        }
    }

    #[test]
    fn test_table_id_without_suffix() {
        assert_eq!(config(false).table_id(TableKind::Users), "users_20240305");
    }

    #[test]
    fn test_table_id_with_run_suffix() {
        assert_eq!(
            config(true).table_id(TableKind::ChannelMembers),
            "channel_members_20240305_00000000-0000-4000-8000-000000000001"
        );
    }

    #[test]
    fn test_table_ref_is_fully_qualified() {
        assert_eq!(
            config(false).table_ref(TableKind::Files).to_string(),
            "acme-data:slack.files_20240305"
        );
    }

    #[tokio::test]
    async fn test_empty_batches_make_no_insert_calls() {
        let warehouse = Arc::new(CountingWarehouse::default());
        let sink = JobClient::new(warehouse.clone(), config(false));
        let channel = Channel {
            id: "C1".to_string(),
            ..Default::default()
        };

        assert_eq!(sink.put_users(&[]).await.unwrap(), 0);
        assert_eq!(sink.put_user_groups(&[]).await.unwrap(), 0);
        assert_eq!(sink.put_channels(&[]).await.unwrap(), 0);
        assert_eq!(sink.put_channel_members(&channel, &[]).await.unwrap(), 0);
        assert_eq!(sink.put_files(&[]).await.unwrap(), 0);

        assert_eq!(warehouse.inserts.load(Ordering::SeqCst), 0);
        assert_eq!(sink.stats().insert_calls, 0);
        assert_eq!(sink.stats().rows.total(), 0);
    }

    #[tokio::test]
    async fn test_existing_table_stops_creation() {
        let warehouse = Arc::new(CountingWarehouse {
            existing: Some(TableMetadata {
                description: None,
                num_rows: Some(42),
                creation_time: Some(1_709_632_800_000),
            }),
            ..Default::default()
        });
        let sink = JobClient::new(warehouse.clone(), config(false));

        let err = sink.ensure_tables().await.unwrap_err();

        assert!(err.is_table_already_exists());
        assert_eq!(warehouse.creates.load(Ordering::SeqCst), 0);
        assert_eq!(sink.stats().tables_created, 0);
    }
}
