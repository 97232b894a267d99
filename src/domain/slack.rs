//! Slack Web API record shapes
//!
//! These structs mirror the JSON objects returned by the Slack Web API
//! (<https://api.slack.com/types>). They are deserialized leniently: every
//! field defaults when absent and fields Slack documents as nullable accept
//! `null`. Fields are declared as Slack documents them; the row mappers pick
//! what is exported.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Deserializes `null` as the type's default value
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A workspace member. See <https://api.slack.com/types/user>.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub team_id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    pub deleted: bool,
    #[serde(deserialize_with = "nullable")]
    pub real_name: String,
    #[serde(deserialize_with = "nullable")]
    pub tz: String,
    #[serde(deserialize_with = "nullable")]
    pub tz_label: String,
    #[serde(deserialize_with = "nullable")]
    pub tz_offset: i64,
    #[serde(deserialize_with = "nullable")]
    pub profile: UserProfile,
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
    #[serde(deserialize_with = "nullable")]
    pub presence: String,
    #[serde(deserialize_with = "nullable")]
    pub locale: String,
}

/// Profile section of a [`User`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    #[serde(deserialize_with = "nullable")]
    pub first_name: String,
    #[serde(deserialize_with = "nullable")]
    pub last_name: String,
    #[serde(deserialize_with = "nullable")]
    pub real_name: String,
    #[serde(deserialize_with = "nullable")]
    pub real_name_normalized: String,
    #[serde(deserialize_with = "nullable")]
    pub display_name: String,
    #[serde(deserialize_with = "nullable")]
    pub display_name_normalized: String,
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    #[serde(deserialize_with = "nullable")]
    pub skype: String,
    #[serde(deserialize_with = "nullable")]
    pub phone: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub bot_id: String,
    #[serde(deserialize_with = "nullable")]
    pub api_app_id: String,
    #[serde(deserialize_with = "nullable")]
    pub status_text: String,
    #[serde(deserialize_with = "nullable")]
    pub status_emoji: String,
    #[serde(deserialize_with = "nullable")]
    pub status_expiration: i64,
    #[serde(deserialize_with = "nullable")]
    pub team: String,
}

/// A user group. See <https://api.slack.com/types/usergroup>.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserGroup {
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub team_id: String,
    pub is_usergroup: bool,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub handle: String,
    pub is_external: bool,
    #[serde(deserialize_with = "nullable")]
    pub date_create: i64,
    #[serde(deserialize_with = "nullable")]
    pub date_update: i64,
    #[serde(deserialize_with = "nullable")]
    pub date_delete: i64,
    #[serde(deserialize_with = "nullable")]
    pub auto_type: String,
    #[serde(deserialize_with = "nullable")]
    pub created_by: String,
    #[serde(deserialize_with = "nullable")]
    pub updated_by: String,
    #[serde(deserialize_with = "nullable")]
    pub deleted_by: String,
    #[serde(deserialize_with = "nullable")]
    pub prefs: UserGroupPrefs,
    #[serde(deserialize_with = "nullable")]
    pub user_count: i64,
    #[serde(deserialize_with = "nullable")]
    pub users: Vec<String>,
}

/// Default channels and groups of a [`UserGroup`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserGroupPrefs {
    #[serde(deserialize_with = "nullable")]
    pub channels: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub groups: Vec<String>,
}

/// A public or private channel. See <https://api.slack.com/types/conversation>.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub creator: String,
    #[serde(deserialize_with = "nullable")]
    pub created: i64,
    pub is_channel: bool,
    pub is_group: bool,
    pub is_general: bool,
    pub is_private: bool,
    pub is_archived: bool,
    #[serde(deserialize_with = "nullable")]
    pub locale: String,
    #[serde(deserialize_with = "nullable")]
    pub topic: Topic,
    #[serde(deserialize_with = "nullable")]
    pub purpose: Purpose,
    #[serde(deserialize_with = "nullable")]
    pub num_members: i64,
}

/// Channel topic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topic {
    #[serde(deserialize_with = "nullable")]
    pub value: String,
    #[serde(deserialize_with = "nullable")]
    pub creator: String,
    #[serde(deserialize_with = "nullable")]
    pub last_set: i64,
}

/// Channel purpose
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Purpose {
    #[serde(deserialize_with = "nullable")]
    pub value: String,
    #[serde(deserialize_with = "nullable")]
    pub creator: String,
    #[serde(deserialize_with = "nullable")]
    pub last_set: i64,
}

/// A channel together with one of its member user ids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelMember {
    pub channel_id: String,
    pub channel_name: String,
    pub member: String,
}

impl ChannelMember {
    /// Pairs a channel with one member id
    pub fn new(channel: &Channel, member: impl Into<String>) -> Self {
        Self {
            channel_id: channel.id.clone(),
            channel_name: channel.name.clone(),
            member: member.into(),
        }
    }
}

/// A shared file. See <https://api.slack.com/types/file>.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct File {
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub created: i64,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub mimetype: String,
    #[serde(deserialize_with = "nullable")]
    pub image_exif_rotation: i64,
    #[serde(deserialize_with = "nullable")]
    pub filetype: String,
    #[serde(deserialize_with = "nullable")]
    pub pretty_type: String,
    #[serde(deserialize_with = "nullable")]
    pub user: String,
    #[serde(deserialize_with = "nullable")]
    pub mode: String,
    pub editable: bool,
    pub is_external: bool,
    #[serde(deserialize_with = "nullable")]
    pub external_type: String,
    #[serde(deserialize_with = "nullable")]
    pub size: i64,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
    #[serde(deserialize_with = "nullable")]
    pub url_download: String,
    #[serde(deserialize_with = "nullable")]
    pub url_private: String,
    #[serde(deserialize_with = "nullable")]
    pub url_private_download: String,
    #[serde(deserialize_with = "nullable")]
    pub original_h: i64,
    #[serde(deserialize_with = "nullable")]
    pub original_w: i64,
    #[serde(deserialize_with = "nullable")]
    pub thumb_64: String,
    #[serde(deserialize_with = "nullable")]
    pub permalink: String,
    #[serde(deserialize_with = "nullable")]
    pub permalink_public: String,
    #[serde(deserialize_with = "nullable")]
    pub edit_link: String,
    #[serde(deserialize_with = "nullable")]
    pub preview: String,
    #[serde(deserialize_with = "nullable")]
    pub preview_highlight: String,
    #[serde(deserialize_with = "nullable")]
    pub lines: i64,
    #[serde(deserialize_with = "nullable")]
    pub lines_more: i64,
    pub is_public: bool,
    pub public_url_shared: bool,
    #[serde(deserialize_with = "nullable")]
    pub channels: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub groups: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub ims: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub initial_comment: Comment,
    #[serde(deserialize_with = "nullable")]
    pub comments_count: i64,
    #[serde(deserialize_with = "nullable")]
    pub num_stars: i64,
    pub is_starred: bool,
    #[serde(deserialize_with = "nullable")]
    pub shares: Shares,
}

/// A file comment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub created: i64,
    #[serde(deserialize_with = "nullable")]
    pub user: String,
    #[serde(deserialize_with = "nullable")]
    pub comment: String,
}

/// Where a file has been shared, keyed by channel id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shares {
    #[serde(deserialize_with = "nullable")]
    pub public: BTreeMap<String, Vec<ShareFileInfo>>,
    #[serde(deserialize_with = "nullable")]
    pub private: BTreeMap<String, Vec<ShareFileInfo>>,
}

/// One share of a file into a channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareFileInfo {
    #[serde(deserialize_with = "nullable")]
    pub reply_users: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub reply_users_count: i64,
    #[serde(deserialize_with = "nullable")]
    pub reply_count: i64,
    #[serde(deserialize_with = "nullable")]
    pub ts: String,
    #[serde(deserialize_with = "nullable")]
    pub thread_ts: String,
    #[serde(deserialize_with = "nullable")]
    pub latest_reply: String,
    #[serde(deserialize_with = "nullable")]
    pub channel_name: String,
    #[serde(deserialize_with = "nullable")]
    pub team_id: String,
}
