//! Warehouse row types
//!
//! One module per exported entity. Each row type implements [`Row`]: a total
//! mapping from the Slack record, the dedup insert id, the dated table name,
//! an explicit schema and a table description.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use slack_export::core::tables::{Row, UsersRow};
//!
//! let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
//! assert_eq!(UsersRow::table_id(date), "users_20240305");
//! assert_eq!(UsersRow::from_source(None), UsersRow::default());
//! ```

pub mod channel_members;
pub mod channels;
pub mod files;
pub mod schema;
pub mod usergroups;
pub mod users;

pub use channel_members::ChannelMembersRow;
pub use channels::{ChannelsRow, PurposeRow, TopicRow};
pub use files::{CommentRow, FilesRow, ShareFileInfoRow, SharesRow};
pub use schema::{FieldMode, FieldSchema, FieldType, TableSchema};
pub use usergroups::{UserGroupPrefsRow, UserGroupsRow};
pub use users::{UserProfileRow, UsersRow};

use crate::domain::ids::{compact_date, RunId};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};
use serde::Serialize;
use std::fmt;

/// The exported entity tables, in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Users,
    UserGroups,
    Channels,
    ChannelMembers,
    Files,
}

impl TableKind {
    /// Every table a run creates, in the order it creates them
    pub const ALL: [TableKind; 5] = [
        TableKind::Users,
        TableKind::UserGroups,
        TableKind::Channels,
        TableKind::ChannelMembers,
        TableKind::Files,
    ];

    /// Entity name, used as the table name prefix
    pub fn entity(&self) -> &'static str {
        match self {
            TableKind::Users => "users",
            TableKind::UserGroups => "usergroups",
            TableKind::Channels => "channels",
            TableKind::ChannelMembers => "channel_members",
            TableKind::Files => "files",
        }
    }

    /// `<entity>_<YYYYMMDD>`
    pub fn table_id(&self, date: NaiveDate) -> String {
        format!("{}_{}", self.entity(), compact_date(date))
    }

    /// Column schema of the entity's table
    pub fn schema(&self) -> TableSchema {
        match self {
            TableKind::Users => UsersRow::schema(),
            TableKind::UserGroups => UserGroupsRow::schema(),
            TableKind::Channels => ChannelsRow::schema(),
            TableKind::ChannelMembers => ChannelMembersRow::schema(),
            TableKind::Files => FilesRow::schema(),
        }
    }

    /// Table description
    pub fn description(&self) -> &'static str {
        match self {
            TableKind::Users => UsersRow::DESCRIPTION,
            TableKind::UserGroups => UserGroupsRow::DESCRIPTION,
            TableKind::Channels => ChannelsRow::DESCRIPTION,
            TableKind::ChannelMembers => ChannelMembersRow::DESCRIPTION,
            TableKind::Files => FilesRow::DESCRIPTION,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entity())
    }
}

/// A warehouse row mapped from a Slack record
pub trait Row: Serialize + Default + Send + Sync {
    /// Slack record the row is mapped from
    type Source;

    /// Table the row is written to
    const KIND: TableKind;

    /// Human-readable table description
    const DESCRIPTION: &'static str;

    /// Maps a Slack record into a row. `None` yields the zero-valued row.
    fn from_source(source: Option<&Self::Source>) -> Self;

    /// Fields that identify the record within a run
    fn natural_key(&self) -> Vec<&str>;

    /// Column schema
    fn schema() -> TableSchema;

    /// Dedup id: the run id followed by the natural key, joined by `-`
    fn insert_id(&self, run_id: &RunId) -> String {
        let mut parts = vec![run_id.to_string()];
        parts.extend(self.natural_key().into_iter().map(str::to_string));
        parts.join("-")
    }

    /// Table name for the run date
    fn table_id(date: NaiveDate) -> String {
        Self::KIND.table_id(date)
    }
}

/// Converts Unix seconds into a UTC civil date-time. Out-of-range values map to the epoch.
pub(crate) fn unix_to_datetime(secs: i64) -> NaiveDateTime {
    DateTime::from_timestamp(secs, 0)
        .unwrap_or_default()
        .naive_utc()
}

/// Renders Unix seconds as RFC 3339 UTC, or an empty string when unset
pub(crate) fn unix_to_rfc3339(secs: i64) -> String {
    if secs == 0 {
        return String::new();
    }
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}
