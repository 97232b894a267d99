//! External system integrations.
//!
//! - [`slack`] - Slack Web API source
//! - [`bigquery`] - BigQuery REST warehouse
//! - [`gcp`] - Google access tokens and Secret Manager
//!
//! # Design Pattern
//!
//! Both ends of the pipeline sit behind traits ([`slack::SlackApi`] and
//! [`bigquery::Warehouse`]) so the orchestration can be tested against
//! in-memory fakes.

pub mod bigquery;
pub mod gcp;
pub mod slack;
