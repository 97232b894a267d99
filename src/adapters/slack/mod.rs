//! Slack adapter
//!
//! - [`api`]: the [`SlackApi`] trait, one method per Web API call
//! - [`web`]: its HTTP implementation
//! - [`client`]: [`SlackClient`], which pages through listings and feeds batches to a consumer

pub mod api;
pub mod client;
pub mod web;

pub use api::{Page, SlackApi};
pub use client::{paginate, SlackClient};
pub use web::SlackWebApi;
