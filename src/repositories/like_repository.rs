use async_trait::async_trait;
use tokio_postgres::Row;

use super::pg::{PgStore, map_pg_error};
use super::RepoResult;
use crate::models::like::Like;

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Fails with `RepoError::Conflict` when (user, post) already has a row.
    async fn create(&self, user: i64, post: i64) -> RepoResult<Like>;
    async fn find(&self, id: i64) -> RepoResult<Option<Like>>;
    async fn find_for(&self, user: i64, post: i64) -> RepoResult<Option<Like>>;
    async fn list(&self) -> RepoResult<Vec<Like>>;
    async fn list_for_post(&self, post: i64) -> RepoResult<Vec<Like>>;
    /// Points the like at another post; same uniqueness rule as `create`.
    async fn move_to_post(&self, id: i64, post: i64) -> RepoResult<Option<Like>>;
    async fn delete(&self, id: i64) -> RepoResult<bool>;
    async fn delete_for(&self, user: i64, post: i64) -> RepoResult<bool>;
}

fn like_from_row(row: &Row) -> RepoResult<Like> {
    Ok(Like {
        id: row.try_get("id").map_err(map_pg_error)?,
        user: row.try_get("user_id").map_err(map_pg_error)?,
        post: row.try_get("post_id").map_err(map_pg_error)?,
        time: row.try_get("time").map_err(map_pg_error)?,
    })
}

#[async_trait]
impl LikeRepository for PgStore {
    async fn create(&self, user: i64, post: i64) -> RepoResult<Like> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO likes (user_id, post_id) VALUES ($1, $2) \
                 RETURNING id, user_id, post_id, time",
                &[&user, &post],
            )
            .await
            .map_err(map_pg_error)?;
        like_from_row(&row)
    }

    async fn find(&self, id: i64) -> RepoResult<Option<Like>> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT id, user_id, post_id, time FROM likes WHERE id = $1",
                &[&id],
            )
            .await
            .map_err(map_pg_error)?;
        row.as_ref().map(like_from_row).transpose()
    }

    async fn find_for(&self, user: i64, post: i64) -> RepoResult<Option<Like>> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT id, user_id, post_id, time FROM likes \
                 WHERE user_id = $1 AND post_id = $2",
                &[&user, &post],
            )
            .await
            .map_err(map_pg_error)?;
        row.as_ref().map(like_from_row).transpose()
    }

    async fn list(&self) -> RepoResult<Vec<Like>> {
        let client = self.client().await?;
        let rows = client
            .query("SELECT id, user_id, post_id, time FROM likes ORDER BY id", &[])
            .await
            .map_err(map_pg_error)?;
        rows.iter().map(like_from_row).collect()
    }

    async fn list_for_post(&self, post: i64) -> RepoResult<Vec<Like>> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT id, user_id, post_id, time FROM likes WHERE post_id = $1 ORDER BY id",
                &[&post],
            )
            .await
            .map_err(map_pg_error)?;
        rows.iter().map(like_from_row).collect()
    }

    async fn move_to_post(&self, id: i64, post: i64) -> RepoResult<Option<Like>> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "UPDATE likes SET post_id = $2, time = NOW() WHERE id = $1 \
                 RETURNING id, user_id, post_id, time",
                &[&id, &post],
            )
            .await
            .map_err(map_pg_error)?;
        row.as_ref().map(like_from_row).transpose()
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let client = self.client().await?;
        let n = client
            .execute("DELETE FROM likes WHERE id = $1", &[&id])
            .await
            .map_err(map_pg_error)?;
        Ok(n > 0)
    }

    async fn delete_for(&self, user: i64, post: i64) -> RepoResult<bool> {
        let client = self.client().await?;
        let n = client
            .execute(
                "DELETE FROM likes WHERE user_id = $1 AND post_id = $2",
                &[&user, &post],
            )
            .await
            .map_err(map_pg_error)?;
        Ok(n > 0)
    }
}
