use serde::{Deserialize, Serialize};

use super::{required, trimmed};
use crate::models::comment::validate_comment;

/// `user` is always the caller; `post` is only read on create.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CommentIn {
    #[serde(default)]
    pub post: Option<i64>,
    #[serde(default, deserialize_with = "trimmed")]
    pub comment: Option<String>,
}

impl CommentIn {
    pub fn validate_create(&self) -> Result<(i64, &str), String> {
        let post = *required("post", &self.post)?;
        let text = required("comment", &self.comment)?;
        validate_comment(text)?;
        Ok((post, text.as_str()))
    }

    pub fn validate_update(&self, partial: bool) -> Result<(), String> {
        match &self.comment {
            Some(text) => validate_comment(text),
            None if partial => Ok(()),
            None => Err("comment: This field is required.".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_text_is_trimmed() {
        let body: CommentIn = serde_json::from_str(r#"{"post": 1, "comment": "  nice  "}"#).unwrap();
        assert_eq!(body.validate_create().unwrap(), (1, "nice"));
    }

    #[test]
    fn whitespace_only_comment_is_blank() {
        let body: CommentIn = serde_json::from_str(r#"{"post": 1, "comment": "   "}"#).unwrap();
        assert_eq!(
            body.validate_create().unwrap_err(),
            "comment: This field may not be blank."
        );
    }

    #[test]
    fn put_requires_text_patch_does_not() {
        let body = CommentIn::default();
        assert!(body.validate_update(false).is_err());
        assert!(body.validate_update(true).is_ok());
    }
}
