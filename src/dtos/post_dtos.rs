use serde::{Deserialize, Serialize};

use super::{double_option, required, trimmed};
use crate::models::post::{
    NewPost, PostChanges, validate_description, validate_image, validate_title,
};

/// Create/update body for posts. Any `author` sent by the client is ignored.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PostIn {
    #[serde(default, deserialize_with = "trimmed")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
}

impl PostIn {
    pub fn validate(&self, partial: bool) -> Result<(), String> {
        if !partial {
            required("title", &self.title)?;
            required("description", &self.description)?;
        }
        if let Some(v) = &self.title {
            validate_title(v)?;
        }
        if let Some(v) = &self.description {
            validate_description(v)?;
        }
        if let Some(image) = &self.image {
            validate_image(image.as_deref())?;
        }
        Ok(())
    }

    /// Call after `validate(false)`.
    pub fn into_new(self, author: i64) -> NewPost {
        NewPost {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            author,
            image: self.image.flatten().filter(|s| !s.is_empty()),
        }
    }

    pub fn into_changes(self) -> PostChanges {
        PostChanges {
            title: self.title,
            description: self.description,
            image: self.image.map(|img| img.filter(|s| !s.is_empty())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_image_clears_absent_image_keeps() {
        let cleared: PostIn = serde_json::from_str(r#"{"image": null}"#).unwrap();
        assert_eq!(cleared.into_changes().image, Some(None));

        let untouched: PostIn = serde_json::from_str(r#"{"title": "t"}"#).unwrap();
        assert_eq!(untouched.into_changes().image, None);
    }

    #[test]
    fn create_requires_title_and_description() {
        let body: PostIn = serde_json::from_str(r#"{"title": "t"}"#).unwrap();
        assert_eq!(
            body.validate(false).unwrap_err(),
            "description: This field is required."
        );
        assert!(body.validate(true).is_ok());
    }

    #[test]
    fn text_fields_are_trimmed_before_length_checks() {
        let padded = format!("  {}  ", "t".repeat(50));
        let body: PostIn =
            serde_json::from_value(serde_json::json!({"title": padded, "description": " d "}))
                .unwrap();
        assert!(body.validate(false).is_ok());

        let post = body.into_new(1);
        assert_eq!(post.title, "t".repeat(50));
        assert_eq!(post.description, "d");
    }

    #[test]
    fn client_author_is_ignored() {
        let body: PostIn =
            serde_json::from_str(r#"{"title":"t","description":"d","author":99}"#).unwrap();
        assert_eq!(body.into_new(3).author, 3);
    }
}
