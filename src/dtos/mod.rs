pub mod auth_dtos;
pub mod comment_dtos;
pub mod like_dtos;
pub mod post_dtos;
pub mod user_dtos;

use serde::{Deserialize, Deserializer, Serialize};

/// Body returned by actions that only report an outcome.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageOut {
    pub message: String,
}

impl MessageOut {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Tells "field absent" (`None`) apart from "field is null" (`Some(None)`).
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Text fields arrive with surrounding whitespace stripped, before any
/// length check runs. Use with `#[serde(default, deserialize_with = "trimmed")]`.
pub fn trimmed<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(|v| v.map(|s| s.trim().to_string()))
}

pub(crate) fn required<'a, T>(field: &str, value: &'a Option<T>) -> Result<&'a T, String> {
    value
        .as_ref()
        .ok_or_else(|| format!("{}: This field is required.", field))
}
