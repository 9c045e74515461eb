use async_trait::async_trait;
use tokio_postgres::Row;

use super::pg::{PgStore, map_pg_error};
use super::RepoResult;
use crate::models::comment::{Comment, NewComment};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> RepoResult<Comment>;
    async fn find(&self, id: i64) -> RepoResult<Option<Comment>>;
    async fn list(&self) -> RepoResult<Vec<Comment>>;
    /// Comments on one post, oldest first.
    async fn list_for_post(&self, post: i64) -> RepoResult<Vec<Comment>>;
    async fn update_text(&self, id: i64, text: String) -> RepoResult<Option<Comment>>;
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

fn comment_from_row(row: &Row) -> RepoResult<Comment> {
    Ok(Comment {
        id: row.try_get("id").map_err(map_pg_error)?,
        user: row.try_get("user_id").map_err(map_pg_error)?,
        post: row.try_get("post_id").map_err(map_pg_error)?,
        comment: row.try_get("comment").map_err(map_pg_error)?,
        time: row.try_get("time").map_err(map_pg_error)?,
    })
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn create(&self, comment: NewComment) -> RepoResult<Comment> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO comments (user_id, post_id, comment) VALUES ($1, $2, $3) \
                 RETURNING id, user_id, post_id, comment, time",
                &[&comment.user, &comment.post, &comment.comment],
            )
            .await
            .map_err(map_pg_error)?;
        comment_from_row(&row)
    }

    async fn find(&self, id: i64) -> RepoResult<Option<Comment>> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT id, user_id, post_id, comment, time FROM comments WHERE id = $1",
                &[&id],
            )
            .await
            .map_err(map_pg_error)?;
        row.as_ref().map(comment_from_row).transpose()
    }

    async fn list(&self) -> RepoResult<Vec<Comment>> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT id, user_id, post_id, comment, time FROM comments ORDER BY id",
                &[],
            )
            .await
            .map_err(map_pg_error)?;
        rows.iter().map(comment_from_row).collect()
    }

    async fn list_for_post(&self, post: i64) -> RepoResult<Vec<Comment>> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT id, user_id, post_id, comment, time FROM comments \
                 WHERE post_id = $1 ORDER BY id",
                &[&post],
            )
            .await
            .map_err(map_pg_error)?;
        rows.iter().map(comment_from_row).collect()
    }

    async fn update_text(&self, id: i64, text: String) -> RepoResult<Option<Comment>> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "UPDATE comments SET comment = $2, time = NOW() WHERE id = $1 \
                 RETURNING id, user_id, post_id, comment, time",
                &[&id, &text],
            )
            .await
            .map_err(map_pg_error)?;
        row.as_ref().map(comment_from_row).transpose()
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let client = self.client().await?;
        let n = client
            .execute("DELETE FROM comments WHERE id = $1", &[&id])
            .await
            .map_err(map_pg_error)?;
        Ok(n > 0)
    }
}
