//! Slack source client
//!
//! Streams Slack records to a consumer, one batch per page. Errors from the
//! API or from the consumer stop the listing and are labelled with the
//! listing they interrupted (`list users`, `list channels`, ...).

use super::api::{Page, SlackApi};
use crate::domain::{Channel, File, Result, StageContext, User, UserGroup};
use std::future::Future;
use std::sync::Arc;

/// Walks a cursor-paginated listing, handing every page to `consume`
///
/// Stops after the first page whose `next_cursor` is empty, or at the first error.
pub async fn paginate<T, Fetch, FetchFut, Consume, ConsumeFut>(
    mut fetch: Fetch,
    mut consume: Consume,
) -> Result<()>
where
    Fetch: FnMut(String) -> FetchFut,
    FetchFut: Future<Output = Result<Page<T>>>,
    Consume: FnMut(Vec<T>) -> ConsumeFut,
    ConsumeFut: Future<Output = Result<()>>,
{
    let mut cursor = String::new();
    loop {
        let page = fetch(cursor).await?;
        let last = page.is_last();
        let next = page.next_cursor;
        consume(page.items).await?;
        if last {
            return Ok(());
        }
        cursor = next;
    }
}

/// Lists Slack records through a [`SlackApi`]
#[derive(Clone)]
pub struct SlackClient {
    api: Arc<dyn SlackApi>,
}

impl SlackClient {
    pub fn new(api: Arc<dyn SlackApi>) -> Self {
        Self { api }
    }

    /// Lists every workspace user. All pages are gathered first and handed
    /// to `consume` in a single call.
    pub async fn list_users<F, Fut>(&self, mut consume: F) -> Result<()>
    where
        F: FnMut(Vec<User>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        async {
            let mut users = Vec::new();
            paginate(
                |cursor| async move { self.api.users_page(&cursor).await },
                |page| {
                    users.extend(page);
                    async { Ok(()) }
                },
            )
            .await?;
            tracing::debug!(count = users.len(), "Fetched users");
            consume(users).await
        }
        .await
        .stage("list users")
    }

    /// Lists every user group, members included, in a single `consume` call
    pub async fn list_user_groups<F, Fut>(&self, mut consume: F) -> Result<()>
    where
        F: FnMut(Vec<UserGroup>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        async {
            let groups = self.api.user_groups().await?;
            tracing::debug!(count = groups.len(), "Fetched usergroups");
            consume(groups).await
        }
        .await
        .stage("list usergroups")
    }

    /// Lists non-archived public and private channels, one `consume` call per page
    pub async fn list_channels<F, Fut>(&self, consume: F) -> Result<()>
    where
        F: FnMut(Vec<Channel>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        paginate(
            |cursor| async move { self.api.conversations_page(&cursor).await },
            consume,
        )
        .await
        .stage("list channels")
    }

    /// Lists the member ids of one channel, one `consume` call per page
    pub async fn list_channel_members<F, Fut>(&self, channel: &Channel, consume: F) -> Result<()>
    where
        F: FnMut(Vec<String>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let channel_id = channel.id.as_str();
        paginate(
            |cursor| async move {
                self.api
                    .conversation_members_page(channel_id, &cursor)
                    .await
            },
            consume,
        )
        .await
        .stage("list channel members")
    }

    /// Lists files visible to the token, one `consume` call per page
    pub async fn list_files<F, Fut>(&self, consume: F) -> Result<()>
    where
        F: FnMut(Vec<File>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        paginate(
            |cursor| async move { self.api.files_page(&cursor).await },
            consume,
        )
        .await
        .stage("list files")
    }
}
