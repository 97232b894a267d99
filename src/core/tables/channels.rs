//! `channels` table

use super::schema::{boolean, string, FieldSchema, TableSchema};
use super::{unix_to_rfc3339, Row, TableKind};
use crate::domain::slack::{Channel, Purpose, Topic};
use serde::Serialize;

/// A public or private channel, following the structure of the Web API.
/// Field descriptions: <https://api.slack.com/types/channel>
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelsRow {
    pub org: String,
    pub id: String,
    pub name: String,
    pub creator: String,
    pub topic: TopicRow,
    pub purpose: PurposeRow,
    pub is_channel: bool,
    pub is_general: bool,
    pub locale: String,
    pub created: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopicRow {
    pub value: String,
    pub creator: String,
    pub last_set: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PurposeRow {
    pub value: String,
    pub creator: String,
    pub last_set: String,
}

impl ChannelsRow {
    /// Tags the row with the exporting organization
    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = org.into();
        self
    }
}

impl From<&Topic> for TopicRow {
    fn from(t: &Topic) -> Self {
        Self {
            value: t.value.clone(),
            creator: t.creator.clone(),
            last_set: unix_to_rfc3339(t.last_set),
        }
    }
}

impl From<&Purpose> for PurposeRow {
    fn from(p: &Purpose) -> Self {
        Self {
            value: p.value.clone(),
            creator: p.creator.clone(),
            last_set: unix_to_rfc3339(p.last_set),
        }
    }
}

fn text_with_author(name: &'static str) -> FieldSchema {
    FieldSchema::record(
        name,
        vec![string("value"), string("creator"), string("last_set")],
    )
}

impl Row for ChannelsRow {
    type Source = Channel;

    const KIND: TableKind = TableKind::Channels;

    const DESCRIPTION: &'static str = "channels follows the structure of the WebAPI. \
        For field descriptions see the official documentation: https://api.slack.com/types/channel";

    fn from_source(source: Option<&Channel>) -> Self {
        let Some(c) = source else {
            return Self::default();
        };
        Self {
            org: String::new(),
            id: c.id.clone(),
            name: c.name.clone(),
            creator: c.creator.clone(),
            topic: TopicRow::from(&c.topic),
            purpose: PurposeRow::from(&c.purpose),
            is_channel: c.is_channel,
            is_general: c.is_general,
            locale: c.locale.clone(),
            created: unix_to_rfc3339(c.created),
        }
    }

    fn natural_key(&self) -> Vec<&str> {
        vec![self.id.as_str()]
    }

    fn schema() -> TableSchema {
        TableSchema::new(vec![
            string("org"),
            string("id"),
            string("name"),
            string("creator"),
            text_with_author("topic"),
            text_with_author("purpose"),
            boolean("is_channel"),
            boolean("is_general"),
            string("locale"),
            string("created"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_channel_with_topic_and_purpose() {
        let channel: Channel = serde_json::from_value(serde_json::json!({
            "id": "C012AB3CD",
            "name": "general",
            "creator": "U012A3CDE",
            "created": 1709632800,
            "is_channel": true,
            "is_general": true,
            "topic": {"value": "Company-wide", "creator": "U012A3CDE", "last_set": 1709632800},
            "purpose": {"value": "Announcements", "creator": "", "last_set": 0}
        }))
        .unwrap();

        let row = ChannelsRow::from_source(Some(&channel)).with_org("acme");
        assert_eq!(row.org, "acme");
        assert_eq!(row.id, "C012AB3CD");
        assert!(row.is_general);
        assert_eq!(row.created, "2024-03-05T10:00:00Z");
        assert_eq!(row.topic.value, "Company-wide");
        assert_eq!(row.topic.last_set, "2024-03-05T10:00:00Z");
        assert_eq!(row.purpose.value, "Announcements");
        assert_eq!(row.purpose.last_set, "");
    }

    #[test]
    fn test_none_maps_to_zero_row() {
        assert_eq!(ChannelsRow::from_source(None), ChannelsRow::default());
    }

    #[test]
    fn test_schema_nests_topic_and_purpose() {
        let schema = ChannelsRow::schema();
        for name in ["topic", "purpose"] {
            let field = schema.field(name).unwrap();
            let nested: Vec<&str> = field.fields.iter().map(|f| f.name).collect();
            assert_eq!(nested, vec!["value", "creator", "last_set"]);
        }
    }
}
