// src/repositories/mod.rs
//
// Storage seams. Each entity has a trait in its own file, implemented for
// `PgStore` next to the trait and for `MemoryStore` in `memory.rs`.
pub mod comment_repository;
pub mod like_repository;
pub mod memory;
pub mod pg;
pub mod post_repository;
pub mod token_repository;
pub mod user_repository;

use thiserror::Error;

pub use comment_repository::CommentRepository;
pub use like_repository::LikeRepository;
pub use memory::MemoryStore;
pub use pg::PgStore;
pub use post_repository::PostRepository;
pub use token_repository::TokenRepository;
pub use user_repository::UserRepository;

pub const USERNAME_TAKEN: &str = "username: A user with that username already exists.";
pub const PHONE_TAKEN: &str = "phone: user with this phone already exists.";
pub const LIKE_EXISTS: &str = "The fields user, post must make a unique set.";
pub const TOKEN_ALREADY_BLACKLISTED: &str = "Token is blacklisted";
pub const POST_MISSING: &str = "post: Invalid pk - object does not exist.";
pub const USER_MISSING: &str = "user: Invalid pk - object does not exist.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),
    /// A foreign key pointed at a row that does not exist.
    #[error("{0}")]
    InvalidReference(String),
    #[error("storage backend: {0}")]
    Backend(String),
}

pub type RepoResult<T> = Result<T, RepoError>;
