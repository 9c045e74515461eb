pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

use std::sync::Arc;

use crate::config::TokenSettings;
use crate::repositories::{
    CommentRepository, LikeRepository, PostRepository, TokenRepository, UserRepository,
};
use crate::services::auth_services::AuthService;
use crate::services::token_services::TokenService;

pub use crate::handlers::configure;

/// Shared handler state. Every repository handle usually points at the same store.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn with_store<S>(store: S, settings: &TokenSettings) -> Self
    where
        S: UserRepository
            + PostRepository
            + CommentRepository
            + LikeRepository
            + TokenRepository
            + 'static,
    {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            likes: store.clone(),
            tokens: TokenService::new(settings, store),
        }
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.users.clone(), self.tokens.clone())
    }
}
