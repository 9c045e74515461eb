// src/repositories/pg.rs - PostgreSQL backend shared by every repository impl
use deadpool_postgres::{Object, Pool};
use log::info;
use tokio_postgres::error::SqlState;

use super::{
    LIKE_EXISTS, PHONE_TAKEN, POST_MISSING, RepoError, RepoResult, TOKEN_ALREADY_BLACKLISTED,
    USER_MISSING, USERNAME_TAKEN,
};

const SCHEMA: &str = include_str!("schema.sql");

#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates missing tables and indexes. Safe to run on every start.
    pub async fn bootstrap(&self) -> RepoResult<()> {
        let client = self.client().await?;
        client.batch_execute(SCHEMA).await.map_err(map_pg_error)?;
        info!("database schema ready");
        Ok(())
    }

    pub(crate) async fn client(&self) -> RepoResult<Object> {
        self.pool
            .get()
            .await
            .map_err(|e| RepoError::Backend(format!("pool: {}", e)))
    }
}

/// Translates constraint violations into domain errors; everything else is a
/// backend failure.
pub(crate) fn map_pg_error(err: tokio_postgres::Error) -> RepoError {
    if let Some(db) = err.as_db_error() {
        let constraint = db.constraint().unwrap_or_default();
        if db.code() == &SqlState::UNIQUE_VIOLATION {
            let msg = match constraint {
                "users_username_key" => USERNAME_TAKEN,
                "users_phone_key" => PHONE_TAKEN,
                "likes_user_post_key" => LIKE_EXISTS,
                "blacklisted_tokens_pkey" => TOKEN_ALREADY_BLACKLISTED,
                _ => "duplicate value",
            };
            return RepoError::Conflict(msg.to_string());
        }
        if db.code() == &SqlState::FOREIGN_KEY_VIOLATION {
            let msg = if constraint.ends_with("post_fkey") {
                POST_MISSING
            } else {
                USER_MISSING
            };
            return RepoError::InvalidReference(msg.to_string());
        }
    }
    RepoError::Backend(err.to_string())
}
