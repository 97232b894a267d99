//! Run identifiers
//!
//! A run is one invocation of the export job. It is identified by a random
//! [`RunId`] and lands in tables keyed by its run date.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier of one export run
///
/// Used as the prefix of every row's insert id and, optionally, as a table
/// name suffix.
///
/// # Examples
///
/// ```
/// use slack_export::domain::ids::RunId;
/// use std::str::FromStr;
///
/// let run_id = RunId::from_str("6f1c1d8e-0b7a-4c1e-9a55-2f3b8a1f4c10").unwrap();
/// assert_eq!(run_id.to_string(), "6f1c1d8e-0b7a-4c1e-9a55-2f3b8a1f4c10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a fresh random run id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RunId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| format!("Invalid run id '{s}': {e}"))
    }
}

/// Formats a run date the way table names expect it (`YYYYMMDD`)
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Today's date in UTC, the default run date
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}
