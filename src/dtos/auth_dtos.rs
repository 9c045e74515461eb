use serde::{Deserialize, Serialize};

use super::required;
use crate::models::user::{
    validate_email, validate_name, validate_password, validate_phone, validate_username,
};

/// Fields are optional at the serde layer so a missing one becomes a
/// validation message instead of a body parse error.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterIn {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl RegisterIn {
    pub fn validate(&self) -> Result<(), String> {
        validate_username(required("username", &self.username)?)?;
        validate_password(required("password", &self.password)?)?;
        validate_phone(required("phone", &self.phone)?)?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(v) = &self.first_name {
            validate_name("first_name", v)?;
        }
        if let Some(v) = &self.last_name {
            validate_name("last_name", v)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginIn {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginOut {
    pub refresh: String,
    pub access: String,
    pub user_id: i64,
    pub username: String,
}

/// Body of logout and of the refresh endpoint.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RefreshIn {
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshOut {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}
