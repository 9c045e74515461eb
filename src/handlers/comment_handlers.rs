// src/handlers/comment_handlers.rs
use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use log::info;

use crate::AppState;
use crate::dtos::comment_dtos::CommentIn;
use crate::error::{AppError, AppResult};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::comment::{Comment, NewComment};

#[get("/comment/")]
pub async fn list_comments(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let comments = state.comments.list().await?;
    Ok(HttpResponse::Ok().json(comments))
}

#[get("/comment/{id:\\d+}/")]
pub async fn get_comment(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let comment = find_comment(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// POST /api/comment/
/// `post` must name an existing post; the commenter is the caller.
#[post("/comment/")]
pub async fn create_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CommentIn>,
) -> AppResult<HttpResponse> {
    let (post, text) = body.validate_create().map_err(AppError::ValidationError)?;

    let comment = state
        .comments
        .create(NewComment {
            user: user.user_id,
            post,
            comment: text.to_string(),
        })
        .await?;
    info!("comment {} on post {} by user {}", comment.id, post, user.user_id);
    Ok(HttpResponse::Created().json(comment))
}

#[put("/comment/{id:\\d+}/")]
pub async fn replace_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<CommentIn>,
) -> AppResult<HttpResponse> {
    update_comment(&state, &user, path.into_inner(), body.into_inner(), false).await
}

#[patch("/comment/{id:\\d+}/")]
pub async fn patch_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<CommentIn>,
) -> AppResult<HttpResponse> {
    update_comment(&state, &user, path.into_inner(), body.into_inner(), true).await
}

// Only the text is writable. A `post` key in the body is ignored, and a
// PATCH without `comment` re-saves the current text so `time` still moves.
async fn update_comment(
    state: &AppState,
    user: &AuthenticatedUser,
    id: i64,
    body: CommentIn,
    partial: bool,
) -> AppResult<HttpResponse> {
    let existing = find_comment(state, id).await?;
    if existing.user != user.user_id {
        return Err(AppError::not_authorized());
    }
    body.validate_update(partial)
        .map_err(AppError::ValidationError)?;

    let text = body.comment.unwrap_or(existing.comment);
    let comment = state
        .comments
        .update_text(id, text)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(HttpResponse::Ok().json(comment))
}

#[delete("/comment/{id:\\d+}/")]
pub async fn delete_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let existing = find_comment(&state, id).await?;
    if existing.user != user.user_id {
        return Err(AppError::not_authorized());
    }

    if !state.comments.delete(id).await? {
        return Err(AppError::not_found());
    }
    info!("comment {} deleted by its author {}", id, user.user_id);
    Ok(HttpResponse::NoContent().finish())
}

async fn find_comment(state: &AppState, id: i64) -> AppResult<Comment> {
    state
        .comments
        .find(id)
        .await?
        .ok_or_else(AppError::not_found)
}
