//! Google Cloud plumbing shared by the BigQuery and Secret Manager clients

pub mod auth;
pub mod secret_manager;

pub use auth::AccessTokenProvider;
pub use secret_manager::SecretManagerClient;
