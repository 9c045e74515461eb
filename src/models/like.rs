use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row per (user, post); the pair is unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Like {
    pub id: i64,
    pub user: i64,
    pub post: i64,
    pub time: DateTime<Utc>,
}
