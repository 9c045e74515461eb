use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_LEN: usize = 50;
pub const DESCRIPTION_MAX_LEN: usize = 200;
pub const IMAGE_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub author: i64,
    pub publish_date: DateTime<Utc>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub author: i64,
    pub image: Option<String>,
}

/// `image: Some(None)` clears the reference.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<Option<String>>,
}

impl PostChanges {
    /// Applies the changes and stamps `publish_date`, which moves on every save.
    pub fn apply(self, post: &mut Post, now: DateTime<Utc>) {
        if let Some(v) = self.title {
            post.title = v;
        }
        if let Some(v) = self.description {
            post.description = v;
        }
        if let Some(v) = self.image {
            post.image = v;
        }
        post.publish_date = now;
    }
}

pub fn validate_title(title: &str) -> Result<(), String> {
    bounded_text("title", title, TITLE_MAX_LEN)
}

pub fn validate_description(description: &str) -> Result<(), String> {
    bounded_text("description", description, DESCRIPTION_MAX_LEN)
}

pub fn validate_image(image: Option<&str>) -> Result<(), String> {
    match image {
        Some(path) if path.chars().count() > IMAGE_MAX_LEN => Err(format!(
            "image: Ensure this filename has at most {} characters.",
            IMAGE_MAX_LEN
        )),
        _ => Ok(()),
    }
}

pub(crate) fn bounded_text(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{}: This field may not be blank.", field));
    }
    if value.chars().count() > max {
        return Err(format!(
            "{}: Ensure this field has no more than {} characters.",
            field, max
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_limits() {
        assert!(validate_title("Hello").is_ok());
        assert!(validate_title(&"t".repeat(50)).is_ok());
        assert!(validate_title(&"t".repeat(51)).is_err());
        assert!(validate_title("  ").is_err());
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        // 50 two-byte characters
        assert!(validate_title(&"é".repeat(50)).is_ok());
    }

    #[test]
    fn description_limit() {
        assert!(validate_description(&"d".repeat(200)).is_ok());
        assert!(validate_description(&"d".repeat(201)).is_err());
    }

    #[test]
    fn apply_moves_publish_date() {
        let earlier = Utc::now() - chrono::Duration::hours(1);
        let mut post = Post {
            id: 1,
            title: "a".into(),
            description: "b".into(),
            author: 7,
            publish_date: earlier,
            image: Some("blog_images/x.png".into()),
        };
        let now = Utc::now();
        PostChanges {
            image: Some(None),
            ..Default::default()
        }
        .apply(&mut post, now);
        assert_eq!(post.publish_date, now);
        assert_eq!(post.image, None);
        assert_eq!(post.title, "a");
        assert_eq!(post.author, 7);
    }
}
