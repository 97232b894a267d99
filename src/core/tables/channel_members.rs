//! `channel_members` table

use super::schema::{string, TableSchema};
use super::{Row, TableKind};
use crate::domain::slack::ChannelMember;
use serde::Serialize;

/// A connection between a channel and a member user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelMembersRow {
    pub channel_id: String,
    pub channel_name: String,
    pub member: String,
}

impl Row for ChannelMembersRow {
    type Source = ChannelMember;

    const KIND: TableKind = TableKind::ChannelMembers;

    const DESCRIPTION: &'static str =
        "channel_members is a connection between a channel and a member user.";

    fn from_source(source: Option<&ChannelMember>) -> Self {
        source
            .map(|m| Self {
                channel_id: m.channel_id.clone(),
                channel_name: m.channel_name.clone(),
                member: m.member.clone(),
            })
            .unwrap_or_default()
    }

    fn natural_key(&self) -> Vec<&str> {
        vec![self.channel_id.as_str(), self.member.as_str()]
    }

    fn schema() -> TableSchema {
        TableSchema::new(vec![
            string("channel_id"),
            string("channel_name"),
            string("member"),
        ])
    }
}
