use async_trait::async_trait;
use uuid::Uuid;

use super::pg::{PgStore, map_pg_error};
use super::RepoResult;
use crate::models::token::BlacklistedToken;

/// Persistence for revoked refresh tokens, keyed by `jti`.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Fails with `RepoError::Conflict` if the jti is already revoked.
    async fn blacklist(&self, token: BlacklistedToken) -> RepoResult<()>;
    async fn is_blacklisted(&self, jti: Uuid) -> RepoResult<bool>;
}

#[async_trait]
impl TokenRepository for PgStore {
    async fn blacklist(&self, token: BlacklistedToken) -> RepoResult<()> {
        let client = self.client().await?;
        client
            .execute(
                "INSERT INTO blacklisted_tokens (jti, user_id, expires_at, blacklisted_at) \
                 VALUES ($1, $2, $3, $4)",
                &[
                    &token.jti,
                    &token.user_id,
                    &token.expires_at,
                    &token.blacklisted_at,
                ],
            )
            .await
            .map_err(map_pg_error)?;
        Ok(())
    }

    async fn is_blacklisted(&self, jti: Uuid) -> RepoResult<bool> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "SELECT EXISTS(SELECT 1 FROM blacklisted_tokens WHERE jti = $1)",
                &[&jti],
            )
            .await
            .map_err(map_pg_error)?;
        row.try_get(0).map_err(map_pg_error)
    }
}
