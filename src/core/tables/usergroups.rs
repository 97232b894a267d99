//! `usergroups` table

use super::schema::{boolean, integer, string, strings, FieldSchema, TableSchema};
use super::{unix_to_rfc3339, Row, TableKind};
use crate::domain::slack::{UserGroup, UserGroupPrefs};
use serde::Serialize;

/// A user group, following the structure of the Web API.
/// Field descriptions: <https://api.slack.com/types/usergroup>
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserGroupsRow {
    pub org: String,
    pub id: String,
    pub team_id: String,
    pub is_usergroup: bool,
    pub name: String,
    pub description: String,
    pub handle: String,
    pub is_external: bool,
    pub date_update: String,
    pub date_delete: String,
    pub auto_type: String,
    pub created_by: String,
    pub updated_by: String,
    pub deleted_by: String,
    pub prefs: UserGroupPrefsRow,
    pub user_count: i64,
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserGroupPrefsRow {
    pub channels: Vec<String>,
    pub groups: Vec<String>,
}

impl UserGroupsRow {
    /// Tags the row with the exporting organization
    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = org.into();
        self
    }
}

impl From<&UserGroupPrefs> for UserGroupPrefsRow {
    fn from(p: &UserGroupPrefs) -> Self {
        Self {
            channels: p.channels.clone(),
            groups: p.groups.clone(),
        }
    }
}

impl Row for UserGroupsRow {
    type Source = UserGroup;

    const KIND: TableKind = TableKind::UserGroups;

    const DESCRIPTION: &'static str = "usergroups follows the structure of the WebAPI. \
        For field descriptions see the official documentation: https://api.slack.com/types/usergroup";

    fn from_source(source: Option<&UserGroup>) -> Self {
        let Some(g) = source else {
            return Self::default();
        };
        Self {
            org: String::new(),
            id: g.id.clone(),
            team_id: g.team_id.clone(),
            is_usergroup: g.is_usergroup,
            name: g.name.clone(),
            description: g.description.clone(),
            handle: g.handle.clone(),
            is_external: g.is_external,
            date_update: unix_to_rfc3339(g.date_update),
            date_delete: unix_to_rfc3339(g.date_delete),
            auto_type: g.auto_type.clone(),
            created_by: g.created_by.clone(),
            updated_by: g.updated_by.clone(),
            deleted_by: g.deleted_by.clone(),
            prefs: UserGroupPrefsRow::from(&g.prefs),
            user_count: g.user_count,
            users: g.users.clone(),
        }
    }

    fn natural_key(&self) -> Vec<&str> {
        vec![self.id.as_str()]
    }

    fn schema() -> TableSchema {
        TableSchema::new(vec![
            string("org"),
            string("id"),
            string("team_id"),
            boolean("is_usergroup"),
            string("name"),
            string("description"),
            string("handle"),
            boolean("is_external"),
            string("date_update"),
            string("date_delete"),
            string("auto_type"),
            string("created_by"),
            string("updated_by"),
            string("deleted_by"),
            FieldSchema::record("prefs", vec![strings("channels"), strings("groups")]),
            integer("user_count"),
            strings("users"),
        ])
    }
}
