use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::bounded_text;

pub const COMMENT_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub user: i64,
    pub post: i64,
    pub comment: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub user: i64,
    pub post: i64,
    pub comment: String,
}

pub fn validate_comment(text: &str) -> Result<(), String> {
    bounded_text("comment", text, COMMENT_MAX_LEN)
}
