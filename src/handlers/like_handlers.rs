// src/handlers/like_handlers.rs
//
// Like rows are readable and editable by any authenticated caller. The
// liking user is always the caller on create and never changes afterwards.
use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use log::info;

use crate::AppState;
use crate::dtos::like_dtos::LikeIn;
use crate::dtos::required;
use crate::error::{AppError, AppResult};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::RepoError;

const ALREADY_LIKED: &str = "You have already liked this post";

#[get("/like/")]
pub async fn list_likes(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let likes = state.likes.list().await?;
    Ok(HttpResponse::Ok().json(likes))
}

#[get("/like/{id:\\d+}/")]
pub async fn get_like(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let like = state
        .likes
        .find(path.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(like))
}

#[post("/like/")]
pub async fn create_like(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<LikeIn>,
) -> AppResult<HttpResponse> {
    let post = *required("post", &body.post).map_err(AppError::ValidationError)?;

    if state.likes.find_for(user.user_id, post).await?.is_some() {
        return Err(AppError::BadRequest(ALREADY_LIKED.into()));
    }

    match state.likes.create(user.user_id, post).await {
        Ok(like) => {
            info!("like {} on post {} by user {}", like.id, post, user.user_id);
            Ok(HttpResponse::Created().json(like))
        }
        Err(RepoError::Conflict(_)) => Err(AppError::BadRequest(ALREADY_LIKED.into())),
        Err(e) => Err(e.into()),
    }
}

#[put("/like/{id:\\d+}/")]
pub async fn replace_like(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<LikeIn>,
) -> AppResult<HttpResponse> {
    update_like(&state, path.into_inner(), body.into_inner(), false).await
}

#[patch("/like/{id:\\d+}/")]
pub async fn patch_like(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<LikeIn>,
) -> AppResult<HttpResponse> {
    update_like(&state, path.into_inner(), body.into_inner(), true).await
}

async fn update_like(
    state: &AppState,
    id: i64,
    body: LikeIn,
    partial: bool,
) -> AppResult<HttpResponse> {
    let existing = state
        .likes
        .find(id)
        .await?
        .ok_or_else(AppError::not_found)?;

    let post = match body.post {
        Some(post) => post,
        None if partial => existing.post,
        None => {
            return Err(AppError::ValidationError(
                "post: This field is required.".into(),
            ));
        }
    };

    let like = state
        .likes
        .move_to_post(id, post)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(like))
}

#[delete("/like/{id:\\d+}/")]
pub async fn delete_like(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if !state.likes.delete(id).await? {
        return Err(AppError::not_found());
    }
    info!("like {} deleted by user {}", id, user.user_id);
    Ok(HttpResponse::NoContent().finish())
}
