use serde::{Deserialize, Serialize};

/// `user` is always the caller; only the post is taken from the body.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LikeIn {
    #[serde(default)]
    pub post: Option<i64>,
}
