//! End-to-end tests of an export run against in-memory Slack and BigQuery fakes

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use slack_export::adapters::bigquery::{
    InsertRow, TableDefinition, TableMetadata, TableRef, Warehouse,
};
use slack_export::adapters::slack::{Page, SlackApi, SlackClient};
use slack_export::core::export::{ExportCoordinator, JobClient, JobConfig};
use slack_export::domain::{
    Channel, ExportError, File, Result, RunId, SlackError, User, UserGroup, WarehouseError,
};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

const RUN_ID: &str = "7b0c2f59-3f7e-4a63-9d4e-1c2a3b4c5d6e";

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Create(String),
    Insert(String, Vec<Value>),
}

/// Records every warehouse call
#[derive(Default)]
struct FakeWarehouse {
    existing: HashSet<String>,
    reject_inserts_into: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeWarehouse {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn created(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(t) => Some(t),
                Call::Insert(..) => None,
            })
            .collect()
    }

    /// (table, key field of each row) per insert call
    fn inserts(&self, key: fn(&str) -> &'static str) -> Vec<(String, Vec<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Insert(table, rows) => {
                    let field = key(&table);
                    let keys = rows
                        .iter()
                        .map(|r| r[field].as_str().unwrap_or_default().to_string())
                        .collect();
                    Some((table, keys))
                }
                Call::Create(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl Warehouse for FakeWarehouse {
    async fn table_metadata(&self, table: &TableRef) -> Result<TableMetadata> {
        if self.existing.contains(&table.table_id) {
            Ok(TableMetadata::default())
        } else {
            Err(WarehouseError::TableNotFound(table.to_string()).into())
        }
    }

    async fn create_table(&self, table: &TableRef, _definition: &TableDefinition) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Create(table.table_id.clone()));
        Ok(())
    }

    async fn insert_rows(&self, table: &TableRef, rows: Vec<InsertRow>) -> Result<()> {
        if self.reject_inserts_into.as_deref() == Some(table.table_id.as_str()) {
            return Err(WarehouseError::InsertFailed {
                table: table.to_string(),
                failed_rows: rows.len(),
                message: "row 0: invalid: no such field".to_string(),
            }
            .into());
        }
        self.calls.lock().unwrap().push(Call::Insert(
            table.table_id.clone(),
            rows.into_iter().map(|r| r.json).collect(),
        ));
        Ok(())
    }
}

/// Serves fixed pages and counts requests
#[derive(Default)]
struct FakeSlack {
    users: Vec<User>,
    users_error: bool,
    channel_pages: Vec<Vec<Channel>>,
    members: HashMap<String, Vec<String>>,
    members_error: bool,
    files: Vec<File>,
    hang: bool,
    requests: Mutex<Vec<String>>,
}

impl FakeSlack {
    fn record(&self, method: &str) {
        self.requests.lock().unwrap().push(method.to_string());
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SlackApi for FakeSlack {
    async fn users_page(&self, _cursor: &str) -> Result<Page<User>> {
        self.record("users.list");
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.users_error {
            return Err(SlackError::AuthenticationFailed("invalid_auth".to_string()).into());
        }
        Ok(Page::last(self.users.clone()))
    }

    async fn user_groups(&self) -> Result<Vec<UserGroup>> {
        self.record("usergroups.list");
        Ok(Vec::new())
    }

    async fn conversations_page(&self, cursor: &str) -> Result<Page<Channel>> {
        self.record("conversations.list");
        let index: usize = if cursor.is_empty() {
            0
        } else {
            cursor.parse().unwrap()
        };
        let items = self.channel_pages.get(index).cloned().unwrap_or_default();
        if index + 1 < self.channel_pages.len() {
            Ok(Page::new(items, (index + 1).to_string()))
        } else {
            Ok(Page::last(items))
        }
    }

    async fn conversation_members_page(
        &self,
        channel_id: &str,
        _cursor: &str,
    ) -> Result<Page<String>> {
        self.record("conversations.members");
        if self.members_error {
            return Err(SlackError::Api {
                method: "conversations.members".to_string(),
                code: "channel_not_found".to_string(),
            }
            .into());
        }
        Ok(Page::last(
            self.members.get(channel_id).cloned().unwrap_or_default(),
        ))
    }

    async fn files_page(&self, _cursor: &str) -> Result<Page<File>> {
        self.record("files.list");
        Ok(Page::last(self.files.clone()))
    }
}

fn channel(id: &str, name: &str) -> Channel {
    Channel {
        id: id.to_string(),
        name: name.to_string(),
        is_channel: true,
        created: 1_709_632_800,
        ..Default::default()
    }
}

/// Two pages of channels: [C1] then [C2]; C1 has U1 and U2, C2 has U3
fn two_page_slack() -> FakeSlack {
    FakeSlack {
        channel_pages: vec![vec![channel("C1", "general")], vec![channel("C2", "random")]],
        members: HashMap::from([
            ("C1".to_string(), vec!["U1".to_string(), "U2".to_string()]),
            ("C2".to_string(), vec!["U3".to_string()]),
        ]),
        ..Default::default()
    }
}

fn job(append_id_suffix: bool) -> JobConfig {
    JobConfig {
        project_id: "acme-data".to_string(),
        dataset: "slack".to_string(),
        org: "acme".to_string(),
        run_id: RunId::from_str(RUN_ID).unwrap(),
        date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        append_id_suffix,
    }
}

fn coordinator(
    slack: Arc<FakeSlack>,
    warehouse: Arc<FakeWarehouse>,
    shutdown: watch::Receiver<bool>,
) -> ExportCoordinator {
    ExportCoordinator::new(
        SlackClient::new(slack),
        JobClient::new(warehouse, job(false)),
        shutdown,
    )
}

fn key_field(table: &str) -> &'static str {
    if table.starts_with("channel_members") {
        "member"
    } else {
        "id"
    }
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_two_page_run_interleaves_channels_and_members() {
    let slack = Arc::new(two_page_slack());
    let warehouse = Arc::new(FakeWarehouse::default());
    let (_tx, rx) = watch::channel(false);

    let summary = coordinator(slack.clone(), warehouse.clone(), rx)
        .run()
        .await
        .unwrap();

    assert_eq!(
        warehouse.created(),
        vec![
            "users_20240305",
            "usergroups_20240305",
            "channels_20240305",
            "channel_members_20240305",
            "files_20240305",
        ]
    );
    assert_eq!(
        warehouse.inserts(key_field),
        vec![
            ("channels_20240305".to_string(), ids(&["C1"])),
            ("channel_members_20240305".to_string(), ids(&["U1", "U2"])),
            ("channels_20240305".to_string(), ids(&["C2"])),
            ("channel_members_20240305".to_string(), ids(&["U3"])),
        ]
    );

    assert_eq!(summary.tables_created, 5);
    assert_eq!(summary.insert_calls, 4);
    assert_eq!(summary.rows.channels, 2);
    assert_eq!(summary.rows.channel_members, 3);
    assert_eq!(summary.rows.users, 0);
    assert_eq!(summary.run_id.to_string(), RUN_ID);
    assert_eq!(
        slack.requests(),
        vec![
            "users.list",
            "usergroups.list",
            "conversations.list",
            "conversations.members",
            "conversations.list",
            "conversations.members",
            "files.list",
        ]
    );
}

#[tokio::test]
async fn test_rows_carry_org_and_channel_name() {
    let slack = Arc::new(two_page_slack());
    let warehouse = Arc::new(FakeWarehouse::default());
    let (_tx, rx) = watch::channel(false);

    coordinator(slack, warehouse.clone(), rx).run().await.unwrap();

    let calls = warehouse.calls();
    let Call::Insert(_, channels) = &calls[5] else {
        panic!("expected channels insert, got {:?}", calls[5]);
    };
    assert_eq!(channels[0]["org"], "acme");
    assert_eq!(channels[0]["name"], "general");

    let Call::Insert(_, members) = &calls[6] else {
        panic!("expected channel members insert, got {:?}", calls[6]);
    };
    assert_eq!(members[0]["channel_id"], "C1");
    assert_eq!(members[0]["channel_name"], "general");
}

#[tokio::test]
async fn test_users_batch_is_written_once() {
    let slack = Arc::new(FakeSlack {
        users: vec![
            User {
                id: "U1".to_string(),
                name: "ada".to_string(),
                ..Default::default()
            },
            User {
                id: "U2".to_string(),
                name: "grace".to_string(),
                ..Default::default()
            },
        ],
        ..Default::default()
    });
    let warehouse = Arc::new(FakeWarehouse::default());
    let (_tx, rx) = watch::channel(false);

    let summary = coordinator(slack, warehouse.clone(), rx).run().await.unwrap();

    assert_eq!(
        warehouse.inserts(key_field),
        vec![("users_20240305".to_string(), ids(&["U1", "U2"]))]
    );
    assert_eq!(summary.rows.users, 2);
}

#[tokio::test]
async fn test_users_auth_failure_stops_run_before_any_insert() {
    let slack = Arc::new(FakeSlack {
        users_error: true,
        ..two_page_slack()
    });
    let warehouse = Arc::new(FakeWarehouse::default());
    let (_tx, rx) = watch::channel(false);

    let err = coordinator(slack.clone(), warehouse.clone(), rx)
        .run()
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("export users"), "{message}");
    assert!(message.contains("list users"), "{message}");
    assert!(message.contains("invalid_auth"), "{message}");
    assert!(warehouse.inserts(key_field).is_empty());
    assert_eq!(slack.requests(), vec!["users.list"]);
}

#[tokio::test]
async fn test_existing_table_fails_before_slack_is_called() {
    let slack = Arc::new(two_page_slack());
    let warehouse = Arc::new(FakeWarehouse {
        existing: HashSet::from(["channels_20240305".to_string()]),
        ..Default::default()
    });
    let (_tx, rx) = watch::channel(false);

    let err = coordinator(slack.clone(), warehouse.clone(), rx)
        .run()
        .await
        .unwrap_err();

    assert!(err.is_table_already_exists());
    let message = err.to_string();
    assert!(message.contains("create table channels_20240305"), "{message}");
    assert!(message.contains("already exists"), "{message}");
    assert_eq!(
        warehouse.created(),
        vec!["users_20240305", "usergroups_20240305"]
    );
    assert!(slack.requests().is_empty());
}

#[tokio::test]
async fn test_channel_insert_failure_aborts_run() {
    let slack = Arc::new(two_page_slack());
    let warehouse = Arc::new(FakeWarehouse {
        reject_inserts_into: Some("channels_20240305".to_string()),
        ..Default::default()
    });
    let (_tx, rx) = watch::channel(false);

    let err = coordinator(slack.clone(), warehouse.clone(), rx)
        .run()
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(
        message.starts_with("export channels: list channels: put channels: "),
        "{message}"
    );
    assert!(warehouse.inserts(key_field).is_empty());
    let requests = slack.requests();
    assert!(!requests.contains(&"conversations.members".to_string()));
    assert!(!requests.contains(&"files.list".to_string()));
}

#[tokio::test]
async fn test_member_listing_failure_is_labelled() {
    let slack = Arc::new(FakeSlack {
        members_error: true,
        ..two_page_slack()
    });
    let warehouse = Arc::new(FakeWarehouse::default());
    let (_tx, rx) = watch::channel(false);

    let err = coordinator(slack, warehouse.clone(), rx)
        .run()
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(
        message.contains("export channelmembers: list channel members"),
        "{message}"
    );
    assert!(message.contains("channel_not_found"), "{message}");
    // The first page of channels was written before its members failed
    assert_eq!(
        warehouse.inserts(key_field),
        vec![("channels_20240305".to_string(), ids(&["C1"]))]
    );
}

#[tokio::test]
async fn test_run_id_suffix_applies_to_every_table() {
    let slack = Arc::new(FakeSlack::default());
    let warehouse = Arc::new(FakeWarehouse::default());
    let (_tx, rx) = watch::channel(false);

    ExportCoordinator::new(
        SlackClient::new(slack),
        JobClient::new(warehouse.clone(), job(true)),
        rx,
    )
    .run()
    .await
    .unwrap();

    let created = warehouse.created();
    assert_eq!(created.len(), 5);
    assert!(created.iter().all(|t| t.ends_with(&format!("_20240305_{RUN_ID}"))));
}

#[tokio::test]
async fn test_shutdown_before_start_cancels_run() {
    let slack = Arc::new(two_page_slack());
    let warehouse = Arc::new(FakeWarehouse::default());
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let err = coordinator(slack.clone(), warehouse.clone(), rx)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Cancelled));
    assert!(warehouse.calls().is_empty());
    assert!(slack.requests().is_empty());
}

#[tokio::test]
async fn test_shutdown_interrupts_in_flight_request() {
    let slack = Arc::new(FakeSlack {
        hang: true,
        ..Default::default()
    });
    let warehouse = Arc::new(FakeWarehouse::default());
    let (tx, rx) = watch::channel(false);
    let coordinator = coordinator(slack, warehouse.clone(), rx);

    let run = tokio::spawn(async move { coordinator.run().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(true).unwrap();

    let err = tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .expect("run did not stop after shutdown")
        .unwrap()
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(warehouse.created().len(), 5);
    assert!(warehouse.inserts(key_field).is_empty());
}
