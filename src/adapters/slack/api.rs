//! Slack Web API trait definition
//!
//! One method per Web API call the export needs. Paginated calls take the
//! cursor returned by the previous page (empty for the first page) and return
//! a [`Page`]; an empty `next_cursor` marks the last page.

use crate::domain::{Channel, File, Result, User, UserGroup};
use async_trait::async_trait;

/// One page of a cursor-paginated listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: String,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: impl Into<String>) -> Self {
        Self {
            items,
            next_cursor: next_cursor.into(),
        }
    }

    /// A page with no successor
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, "")
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_empty()
    }
}

/// Slack Web API calls used by the export
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// `users.list`. Scopes: `users:read`, `users:read.email`.
    async fn users_page(&self, cursor: &str) -> Result<Page<User>>;

    /// `usergroups.list` with `include_users=true`. Scope: `usergroups:read`.
    async fn user_groups(&self) -> Result<Vec<UserGroup>>;

    /// `conversations.list` for non-archived public and private channels.
    /// Scopes: `channels:read`, `groups:read`. Only private channels the bot is in are returned.
    async fn conversations_page(&self, cursor: &str) -> Result<Page<Channel>>;

    /// `conversations.members`, returning member user ids
    async fn conversation_members_page(&self, channel_id: &str, cursor: &str)
        -> Result<Page<String>>;

    /// `files.list`. Scope: `files:read`.
    async fn files_page(&self, cursor: &str) -> Result<Page<File>>;
}
