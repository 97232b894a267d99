//! Domain models and types.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Slack record shapes** ([`User`], [`UserGroup`], [`Channel`], [`File`])
//! - **Run identity** ([`RunId`])
//! - **Error types** ([`ExportError`], [`SlackError`], [`WarehouseError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! Stages label their failures with [`StageContext::stage`], producing messages
//! such as `export channels: list channels: put channels: ...`:
//!
//! ```rust
//! use slack_export::domain::{ExportError, Result, StageContext};
//!
//! fn put() -> Result<()> {
//!     Err(ExportError::Serialization("bad row".to_string()))
//! }
//!
//! let err = put().stage("put users").unwrap_err();
//! assert_eq!(err.to_string(), "put users: Serialization error: bad row");
//! ```

pub mod errors;
pub mod ids;
pub mod result;
pub mod slack;

// Re-export commonly used types for convenience
pub use errors::{ExportError, SlackError, StageContext, WarehouseError};
pub use ids::RunId;
pub use result::Result;
pub use slack::{
    Channel, ChannelMember, Comment, File, Purpose, ShareFileInfo, Shares, Topic, User,
    UserGroup, UserGroupPrefs, UserProfile,
};
