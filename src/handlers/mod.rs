pub mod auth_handlers;
pub mod comment_handlers;
pub mod like_handlers;
pub mod post_handlers;
pub mod user_handlers;

use actix_web::{HttpResponse, error, web};

use crate::error::AppError;

/// Registers every `/api` route along with the extractor error handlers.
///
/// Ids are constrained to digits in the route patterns, so `/user/login/`
/// and `/user/logout/` never fall into the `{id}` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(web::PathConfig::default().error_handler(|_err, _req| AppError::not_found().into()))
    .service(
        web::scope("/api")
            // users and sessions
            .service(auth_handlers::login)
            .service(auth_handlers::logout)
            .service(auth_handlers::refresh_token)
            .service(user_handlers::register)
            .service(user_handlers::list_users)
            .service(user_handlers::get_user)
            .service(user_handlers::replace_user)
            .service(user_handlers::patch_user)
            .service(user_handlers::delete_user)
            // blog
            .service(post_handlers::list_posts)
            .service(post_handlers::get_post)
            .service(post_handlers::create_post)
            .service(post_handlers::replace_post)
            .service(post_handlers::patch_post)
            .service(post_handlers::delete_post)
            .service(post_handlers::post_comments)
            .service(post_handlers::post_likes)
            .service(post_handlers::toggle_like)
            // comments
            .service(comment_handlers::list_comments)
            .service(comment_handlers::get_comment)
            .service(comment_handlers::create_comment)
            .service(comment_handlers::replace_comment)
            .service(comment_handlers::patch_comment)
            .service(comment_handlers::delete_comment)
            // likes
            .service(like_handlers::list_likes)
            .service(like_handlers::get_like)
            .service(like_handlers::create_like)
            .service(like_handlers::replace_like)
            .service(like_handlers::patch_like)
            .service(like_handlers::delete_like)
            .default_service(web::to(not_found)),
    );
}

async fn not_found() -> Result<HttpResponse, error::Error> {
    Err(AppError::not_found().into())
}
