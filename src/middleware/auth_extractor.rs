// src/middleware/auth_extractor.rs
use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;
use log::debug;

use crate::AppState;
use crate::error::AppError;

/// Extractor result: a caller holding a valid access token for an active account.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state = state
                .ok_or_else(|| AppError::Internal("application state not configured".into()))?;
            let token = token?;

            let claims = state.tokens.validate_access(&token).map_err(|e| {
                debug!("access token rejected: {}", e);
                AppError::Unauthorized("Given token not valid for any token type".into())
            })?;

            let user = state
                .users
                .find(claims.user_id)
                .await?
                .filter(|u| u.is_active)
                .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

            Ok(AuthenticatedUser {
                user_id: user.id,
                username: user.username,
            })
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
    let not_provided =
        || AppError::Unauthorized("Authentication credentials were not provided.".into());

    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(not_provided)?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header.".into()))?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token.to_string()),
        (Some("Bearer"), None, _) => Err(AppError::Unauthorized(
            "Invalid Authorization header. No credentials provided.".into(),
        )),
        (Some("Bearer"), Some(_), Some(_)) => Err(AppError::Unauthorized(
            "Invalid Authorization header. Credentials string should not contain spaces."
                .into(),
        )),
        _ => Err(not_provided()),
    }
}
