//! `files` table

use super::schema::{boolean, datetime, integer, string, strings, FieldSchema, TableSchema};
use super::{unix_to_datetime, Row, TableKind};
use crate::domain::slack::{Comment, File, ShareFileInfo, Shares};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// A shared file, following the structure of the Web API.
/// Field descriptions: <https://api.slack.com/types/file>
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilesRow {
    pub id: String,
    pub created: NaiveDateTime,
    pub name: String,
    pub title: String,
    pub mimetype: String,
    pub image_exif_rotation: i64,
    pub filetype: String,
    pub pretty_type: String,
    pub user: String,
    pub mode: String,
    pub editable: bool,
    pub is_external: bool,
    pub external_type: String,
    pub size: i64,
    pub url: String,
    pub url_download: String,
    pub url_private: String,
    pub url_private_download: String,
    pub original_h: i64,
    pub original_w: i64,
    pub thumb_64: String,
    pub permalink: String,
    pub permalink_public: String,
    pub edit_link: String,
    pub preview: String,
    pub preview_highlight: String,
    pub lines: i64,
    pub lines_more: i64,
    pub is_public: bool,
    pub public_url_shared: bool,
    pub channels: Vec<String>,
    pub groups: Vec<String>,
    pub ims: Vec<String>,
    pub initial_comment: CommentRow,
    pub comments_count: i64,
    pub num_stars: i64,
    pub is_starred: bool,
    pub shares: SharesRow,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommentRow {
    pub id: String,
    pub created: NaiveDateTime,
    pub user: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SharesRow {
    pub public: Vec<ShareFileInfoRow>,
    pub private: Vec<ShareFileInfoRow>,
}

/// One share of a file into a channel. `id` is the channel id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShareFileInfoRow {
    pub id: String,
    pub reply_users: Vec<String>,
    pub reply_users_count: i64,
    pub reply_count: i64,
    pub ts: String,
    pub thread_ts: String,
    pub latest_reply: String,
    pub channel_name: String,
    pub team_id: String,
}

impl ShareFileInfoRow {
    fn new(channel_id: &str, info: &ShareFileInfo) -> Self {
        Self {
            id: channel_id.to_string(),
            reply_users: info.reply_users.clone(),
            reply_users_count: info.reply_users_count,
            reply_count: info.reply_count,
            ts: info.ts.clone(),
            thread_ts: info.thread_ts.clone(),
            latest_reply: info.latest_reply.clone(),
            channel_name: info.channel_name.clone(),
            team_id: info.team_id.clone(),
        }
    }
}

// BTreeMap iteration keeps the flattened list ordered by channel id
fn flatten(shares: &BTreeMap<String, Vec<ShareFileInfo>>) -> Vec<ShareFileInfoRow> {
    shares
        .iter()
        .flat_map(|(channel_id, infos)| {
            infos
                .iter()
                .map(move |info| ShareFileInfoRow::new(channel_id, info))
        })
        .collect()
}

impl From<&Shares> for SharesRow {
    fn from(s: &Shares) -> Self {
        Self {
            public: flatten(&s.public),
            private: flatten(&s.private),
        }
    }
}

impl From<&Comment> for CommentRow {
    fn from(c: &Comment) -> Self {
        Self {
            id: c.id.clone(),
            created: unix_to_datetime(c.created),
            user: c.user.clone(),
            comment: c.comment.clone(),
        }
    }
}

fn share_info(name: &'static str) -> FieldSchema {
    FieldSchema::repeated_record(
        name,
        vec![
            string("id"),
            strings("reply_users"),
            integer("reply_users_count"),
            integer("reply_count"),
            string("ts"),
            string("thread_ts"),
            string("latest_reply"),
            string("channel_name"),
            string("team_id"),
        ],
    )
}

impl Row for FilesRow {
    type Source = File;

    const KIND: TableKind = TableKind::Files;

    const DESCRIPTION: &'static str = "files follows the structure of the WebAPI. \
        For field descriptions see the official documentation: https://api.slack.com/types/file";

    fn from_source(source: Option<&File>) -> Self {
        let Some(f) = source else {
            return Self::default();
        };
        Self {
            id: f.id.clone(),
            created: unix_to_datetime(f.created),
            name: f.name.clone(),
            title: f.title.clone(),
            mimetype: f.mimetype.clone(),
            image_exif_rotation: f.image_exif_rotation,
            filetype: f.filetype.clone(),
            pretty_type: f.pretty_type.clone(),
            user: f.user.clone(),
            mode: f.mode.clone(),
            editable: f.editable,
            is_external: f.is_external,
            external_type: f.external_type.clone(),
            size: f.size,
            url: f.url.clone(),
            url_download: f.url_download.clone(),
            url_private: f.url_private.clone(),
            url_private_download: f.url_private_download.clone(),
            original_h: f.original_h,
            original_w: f.original_w,
            thumb_64: f.thumb_64.clone(),
            permalink: f.permalink.clone(),
            permalink_public: f.permalink_public.clone(),
            edit_link: f.edit_link.clone(),
            preview: f.preview.clone(),
            preview_highlight: f.preview_highlight.clone(),
            lines: f.lines,
            lines_more: f.lines_more,
            is_public: f.is_public,
            public_url_shared: f.public_url_shared,
            channels: f.channels.clone(),
            groups: f.groups.clone(),
            ims: f.ims.clone(),
            initial_comment: CommentRow::from(&f.initial_comment),
            comments_count: f.comments_count,
            num_stars: f.num_stars,
            is_starred: f.is_starred,
            shares: SharesRow::from(&f.shares),
        }
    }

    fn natural_key(&self) -> Vec<&str> {
        vec![self.id.as_str()]
    }

    fn schema() -> TableSchema {
        TableSchema::new(vec![
            string("id"),
            datetime("created"),
            string("name"),
            string("title"),
            string("mimetype"),
            integer("image_exif_rotation"),
            string("filetype"),
            string("pretty_type"),
            string("user"),
            string("mode"),
            boolean("editable"),
            boolean("is_external"),
            string("external_type"),
            integer("size"),
            string("url"),
            string("url_download"),
            string("url_private"),
            string("url_private_download"),
            integer("original_h"),
            integer("original_w"),
            string("thumb_64"),
            string("permalink"),
            string("permalink_public"),
            string("edit_link"),
            string("preview"),
            string("preview_highlight"),
            integer("lines"),
            integer("lines_more"),
            boolean("is_public"),
            boolean("public_url_shared"),
            strings("channels"),
            strings("groups"),
            strings("ims"),
            FieldSchema::record(
                "initial_comment",
                vec![
                    string("id"),
                    datetime("created"),
                    string("user"),
                    string("comment"),
                ],
            ),
            integer("comments_count"),
            integer("num_stars"),
            boolean("is_starred"),
            FieldSchema::record("shares", vec![share_info("public"), share_info("private")]),
        ])
    }
}
