// src/handlers/user_handlers.rs
//
// Any authenticated caller may read, edit or delete any account; there is
// no ownership rule on users.
use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use log::info;

use crate::AppState;
use crate::dtos::auth_dtos::RegisterIn;
use crate::dtos::user_dtos::UserUpdateIn;
use crate::error::{AppError, AppResult};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::user::{UserChanges, UserPublic};
use crate::services::auth_services::{AuthService, hash_off_thread};

/// POST /api/user/
/// Registration, open to anonymous callers.
#[post("/user/")]
pub async fn register(
    svc: web::Data<AuthService>,
    body: web::Json<RegisterIn>,
) -> AppResult<HttpResponse> {
    let user = svc.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

#[get("/user/")]
pub async fn list_users(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let users: Vec<UserPublic> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(UserPublic::from)
        .collect();
    Ok(HttpResponse::Ok().json(users))
}

#[get("/user/{id:\\d+}/")]
pub async fn get_user(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find(path.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(UserPublic::from(user)))
}

#[put("/user/{id:\\d+}/")]
pub async fn replace_user(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<UserUpdateIn>,
) -> AppResult<HttpResponse> {
    update_user(&state, path.into_inner(), body.into_inner(), false).await
}

#[patch("/user/{id:\\d+}/")]
pub async fn patch_user(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<UserUpdateIn>,
) -> AppResult<HttpResponse> {
    update_user(&state, path.into_inner(), body.into_inner(), true).await
}

async fn update_user(
    state: &AppState,
    id: i64,
    body: UserUpdateIn,
    partial: bool,
) -> AppResult<HttpResponse> {
    if state.users.find(id).await?.is_none() {
        return Err(AppError::not_found());
    }
    body.validate(partial).map_err(AppError::ValidationError)?;

    let password_hash = match body.password {
        Some(pw) => Some(hash_off_thread(pw).await?),
        None => None,
    };
    let changes = UserChanges {
        username: body.username,
        password_hash,
        phone: body.phone,
        email: body.email,
        first_name: body.first_name,
        last_name: body.last_name,
    };

    let user = state
        .users
        .update(id, changes)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(UserPublic::from(user)))
}

#[delete("/user/{id:\\d+}/")]
pub async fn delete_user(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if !state.users.delete(id).await? {
        return Err(AppError::not_found());
    }
    info!("user {} deleted by user {}", id, caller.user_id);
    Ok(HttpResponse::NoContent().finish())
}
