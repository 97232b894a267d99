//! `users` table

use super::schema::{boolean, integer, string, FieldSchema, TableSchema};
use super::{Row, TableKind};
use crate::domain::slack::{User, UserProfile};
use serde::Serialize;

/// A workspace member, following the structure of the Web API.
/// Field descriptions: <https://api.slack.com/types/user>
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsersRow {
    pub org: String,
    pub id: String,
    pub team_id: String,
    pub deleted: bool,
    pub real_name: String,
    pub tz: String,
    pub tz_label: String,
    pub tz_offset: i64,
    pub profile: UserProfileRow,
    pub is_bot: bool,
    pub is_admin: bool,
    pub is_owner: bool,
    pub is_primary_owner: bool,
    pub is_restricted: bool,
    pub is_ultra_restricted: bool,
    pub is_stranger: bool,
    pub is_app_user: bool,
    pub is_invited_user: bool,
    pub has_2fa: bool,
    pub has_files: bool,
    pub presence: String,
    pub locale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserProfileRow {
    pub first_name: String,
    pub last_name: String,
    pub real_name: String,
    pub real_name_normalized: String,
    pub display_name: String,
    pub display_name_normalized: String,
    pub email: String,
    pub skype: String,
    pub phone: String,
    pub title: String,
    pub bot_id: String,
    pub api_app_id: String,
    pub status_text: String,
    pub status_emoji: String,
    pub status_expiration: i64,
    pub team: String,
}

impl UsersRow {
    /// Tags the row with the exporting organization
    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = org.into();
        self
    }
}

impl From<&UserProfile> for UserProfileRow {
    fn from(p: &UserProfile) -> Self {
        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            real_name: p.real_name.clone(),
            real_name_normalized: p.real_name_normalized.clone(),
            display_name: p.display_name.clone(),
            display_name_normalized: p.display_name_normalized.clone(),
            email: p.email.clone(),
            skype: p.skype.clone(),
            phone: p.phone.clone(),
            title: p.title.clone(),
            bot_id: p.bot_id.clone(),
            api_app_id: p.api_app_id.clone(),
            status_text: p.status_text.clone(),
            status_emoji: p.status_emoji.clone(),
            status_expiration: p.status_expiration,
            team: p.team.clone(),
        }
    }
}

impl Row for UsersRow {
    type Source = User;

    const KIND: TableKind = TableKind::Users;

    const DESCRIPTION: &'static str = "users follows the structure of the WebAPI. \
        For field descriptions see the official documentation: https://api.slack.com/types/user";

    fn from_source(source: Option<&User>) -> Self {
        let Some(u) = source else {
            return Self::default();
        };
        Self {
            org: String::new(),
            id: u.id.clone(),
            team_id: u.team_id.clone(),
            deleted: u.deleted,
            real_name: u.real_name.clone(),
            tz: u.tz.clone(),
            tz_label: u.tz_label.clone(),
            tz_offset: u.tz_offset,
            profile: UserProfileRow::from(&u.profile),
            is_bot: u.is_bot,
            is_admin: u.is_admin,
            is_owner: u.is_owner,
            is_primary_owner: u.is_primary_owner,
            is_restricted: u.is_restricted,
            is_ultra_restricted: u.is_ultra_restricted,
            is_stranger: u.is_stranger,
            is_app_user: u.is_app_user,
            is_invited_user: u.is_invited_user,
            has_2fa: u.has_2fa,
            has_files: u.has_files,
            presence: u.presence.clone(),
            locale: u.locale.clone(),
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
            boolean("deleted"),
            string("real_name"),
            string("tz"),
            string("tz_label"),
            integer("tz_offset"),
            FieldSchema::record(
                "profile",
                vec![
                    string("first_name"),
                    string("last_name"),
                    string("real_name"),
                    string("real_name_normalized"),
                    string("display_name"),
                    string("display_name_normalized"),
                    string("email"),
                    string("skype"),
                    string("phone"),
                    string("title"),
                    string("bot_id"),
                    string("api_app_id"),
                    string("status_text"),
                    string("status_emoji"),
                    integer("status_expiration"),
                    string("team"),
                ],
            ),
            boolean("is_bot"),
            boolean("is_admin"),
            boolean("is_owner"),
            boolean("is_primary_owner"),
            boolean("is_restricted"),
            boolean("is_ultra_restricted"),
            boolean("is_stranger"),
            boolean("is_app_user"),
            boolean("is_invited_user"),
            boolean("has_2fa"),
            boolean("has_files"),
            string("presence"),
            string("locale"),
        ])
    }
}
