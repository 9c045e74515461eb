use serde::{Deserialize, Serialize};

use super::required;
use crate::models::user::{
    validate_email, validate_name, validate_password, validate_phone, validate_username,
};

/// PUT and PATCH body for `/api/user/{id}/`. Account flags are not writable.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserUpdateIn {
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

impl UserUpdateIn {
    /// A full update (`partial == false`) needs every required field.
    pub fn validate(&self, partial: bool) -> Result<(), String> {
        if !partial {
            required("username", &self.username)?;
            required("password", &self.password)?;
            required("phone", &self.phone)?;
        }
        if let Some(v) = &self.username {
            validate_username(v)?;
        }
        if let Some(v) = &self.password {
            validate_password(v)?;
        }
        if let Some(v) = &self.phone {
            validate_phone(v)?;
        }
        if let Some(v) = &self.email {
            validate_email(v)?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_needs_all_required_fields() {
        let body = UserUpdateIn {
            phone: Some("123".into()),
            ..Default::default()
        };
        assert!(body.validate(false).is_err());
        assert!(body.validate(true).is_ok());
    }

    #[test]
    fn patch_still_validates_given_fields() {
        let body = UserUpdateIn {
            username: Some("not valid!".into()),
            ..Default::default()
        };
        assert!(body.validate(true).is_err());
    }
}
