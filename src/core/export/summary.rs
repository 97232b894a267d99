//! Export summary and reporting

use crate::core::tables::TableKind;
use crate::domain::RunId;
use chrono::NaiveDate;
use std::time::Duration;

/// Rows written per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub users: usize,
    pub usergroups: usize,
    pub channels: usize,
    pub channel_members: usize,
    pub files: usize,
}

impl RowCounts {
    /// Adds `rows` to the counter of `kind`
    pub fn add(&mut self, kind: TableKind, rows: usize) {
        *self.slot(kind) += rows;
    }

    pub fn get(&self, kind: TableKind) -> usize {
        match kind {
            TableKind::Users => self.users,
            TableKind::UserGroups => self.usergroups,
            TableKind::Channels => self.channels,
            TableKind::ChannelMembers => self.channel_members,
            TableKind::Files => self.files,
        }
    }

    pub fn total(&self) -> usize {
        TableKind::ALL.iter().map(|k| self.get(*k)).sum()
    }

    fn slot(&mut self, kind: TableKind) -> &mut usize {
        match kind {
            TableKind::Users => &mut self.users,
            TableKind::UserGroups => &mut self.usergroups,
            TableKind::Channels => &mut self.channels,
            TableKind::ChannelMembers => &mut self.channel_members,
            TableKind::Files => &mut self.files,
        }
    }
}

/// Counters kept by the sink while a run writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub tables_created: usize,
    pub insert_calls: usize,
    pub rows: RowCounts,
}

/// Summary of a completed export run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub run_id: RunId,
    pub date: NaiveDate,
    pub tables_created: usize,
    pub insert_calls: usize,
    pub rows: RowCounts,
    pub duration: Duration,
}

impl ExportSummary {
    pub fn new(run_id: RunId, date: NaiveDate, stats: WriteStats, duration: Duration) -> Self {
        Self {
            run_id,
            date,
            tables_created: stats.tables_created,
            insert_calls: stats.insert_calls,
            rows: stats.rows,
            duration,
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            date = %self.date,
            tables_created = self.tables_created,
            insert_calls = self.insert_calls,
            users = self.rows.users,
            usergroups = self.rows.usergroups,
            channels = self.rows.channels,
            channel_members = self.rows.channel_members,
            files = self.rows.files,
            total_rows = self.rows.total(),
            duration_ms = self.duration.as_millis() as u64,
            "Export completed"
        );
    }
}
