use actix_web::{HttpResponse, post, web};

use crate::dtos::MessageOut;
use crate::dtos::auth_dtos::{LoginIn, RefreshIn};
use crate::error::AppResult;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::services::auth_services::AuthService;

/// POST /api/user/login/
/// Open to anonymous callers. Returns `{refresh, access, user_id, username}`.
#[post("/user/login/")]
pub async fn login(
    svc: web::Data<AuthService>,
    body: web::Json<LoginIn>,
) -> AppResult<HttpResponse> {
    let session = svc.login(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

/// POST /api/user/logout/
/// Blacklists the refresh token in the body.
#[post("/user/logout/")]
pub async fn logout(
    svc: web::Data<AuthService>,
    _user: AuthenticatedUser,
    body: web::Json<RefreshIn>,
) -> AppResult<HttpResponse> {
    svc.logout(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageOut::new("Logged out successfully")))
}

/// POST /api/token/refresh/
#[post("/token/refresh/")]
pub async fn refresh_token(
    svc: web::Data<AuthService>,
    body: web::Json<RefreshIn>,
) -> AppResult<HttpResponse> {
    let tokens = svc.refresh(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tokens))
}
