// src/handlers/post_handlers.rs - blog posts plus the per-post comment/like views

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use log::info;

use crate::AppState;
use crate::dtos::MessageOut;
use crate::dtos::post_dtos::PostIn;
use crate::error::{AppError, AppResult};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::RepoError;

/// GET /api/blog/
/// Public listing, no token needed.
#[get("/blog/")]
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list().await?;
    Ok(HttpResponse::Ok().json(posts))
}

#[get("/blog/{id:\\d+}/")]
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find(path.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/blog/
/// The author is always the caller; an `author` key in the body is ignored.
#[post("/blog/")]
pub async fn create_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<PostIn>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    body.validate(false).map_err(AppError::ValidationError)?;

    let post = state.posts.create(body.into_new(user.user_id)).await?;
    info!("post {} created by user {}", post.id, user.user_id);
    Ok(HttpResponse::Created().json(post))
}

#[put("/blog/{id:\\d+}/")]
pub async fn replace_post(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<PostIn>,
) -> AppResult<HttpResponse> {
    update_post(&state, path.into_inner(), body.into_inner(), false).await
}

#[patch("/blog/{id:\\d+}/")]
pub async fn patch_post(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<PostIn>,
) -> AppResult<HttpResponse> {
    update_post(&state, path.into_inner(), body.into_inner(), true).await
}

// Any authenticated caller may edit any post.
async fn update_post(
    state: &AppState,
    id: i64,
    body: PostIn,
    partial: bool,
) -> AppResult<HttpResponse> {
    if state.posts.find(id).await?.is_none() {
        return Err(AppError::not_found());
    }
    body.validate(partial).map_err(AppError::ValidationError)?;

    let post = state
        .posts
        .update(id, body.into_changes())
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(post))
}

#[delete("/blog/{id:\\d+}/")]
pub async fn delete_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if !state.posts.delete(id).await? {
        return Err(AppError::not_found());
    }
    info!("post {} deleted by user {}", id, user.user_id);
    Ok(HttpResponse::NoContent().finish())
}

#[get("/blog/{id:\\d+}/comments/")]
pub async fn post_comments(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if state.posts.find(id).await?.is_none() {
        return Err(AppError::not_found());
    }
    let comments = state.comments.list_for_post(id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

#[get("/blog/{id:\\d+}/likes/")]
pub async fn post_likes(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if state.posts.find(id).await?.is_none() {
        return Err(AppError::not_found());
    }
    let likes = state.likes.list_for_post(id).await?;
    Ok(HttpResponse::Ok().json(likes))
}

/// POST /api/blog/{id}/like/
///
/// Flips the caller's like on the post: an existing like is removed (200),
/// otherwise one is added (201). Losing an insert race to a concurrent
/// toggle still reports "Post liked" because the row exists afterwards.
#[post("/blog/{id:\\d+}/like/")]
pub async fn toggle_like(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    if state.posts.find(post_id).await?.is_none() {
        return Err(AppError::not_found());
    }

    if state.likes.find_for(user.user_id, post_id).await?.is_some() {
        state.likes.delete_for(user.user_id, post_id).await?;
        info!("user {} unliked post {}", user.user_id, post_id);
        return Ok(HttpResponse::Ok().json(MessageOut::new("Like removed")));
    }

    match state.likes.create(user.user_id, post_id).await {
        Ok(_) | Err(RepoError::Conflict(_)) => {
            info!("user {} liked post {}", user.user_id, post_id);
            Ok(HttpResponse::Created().json(MessageOut::new("Post liked")))
        }
        Err(RepoError::InvalidReference(_)) => Err(AppError::not_found()),
        Err(e) => Err(e.into()),
    }
}
