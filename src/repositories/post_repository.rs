// src/repositories/post_repository.rs
use async_trait::async_trait;
use tokio_postgres::Row;

use super::pg::{PgStore, map_pg_error};
use super::RepoResult;
use crate::models::post::{NewPost, Post, PostChanges};

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> RepoResult<Post>;
    async fn find(&self, id: i64) -> RepoResult<Option<Post>>;
    async fn list(&self) -> RepoResult<Vec<Post>>;
    /// Applies the changes and moves `publish_date` to now.
    async fn update(&self, id: i64, changes: PostChanges) -> RepoResult<Option<Post>>;
    /// Removes the post together with its likes and comments.
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

fn post_from_row(row: &Row) -> RepoResult<Post> {
    Ok(Post {
        id: row.try_get("id").map_err(map_pg_error)?,
        title: row.try_get("title").map_err(map_pg_error)?,
        description: row.try_get("description").map_err(map_pg_error)?,
        author: row.try_get("author_id").map_err(map_pg_error)?,
        publish_date: row.try_get("publish_date").map_err(map_pg_error)?,
        image: row.try_get("image").map_err(map_pg_error)?,
    })
}

#[async_trait]
impl PostRepository for PgStore {
    async fn create(&self, post: NewPost) -> RepoResult<Post> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO posts (title, description, author_id, image) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id, title, description, author_id, publish_date, image",
                &[&post.title, &post.description, &post.author, &post.image],
            )
            .await
            .map_err(map_pg_error)?;
        post_from_row(&row)
    }

    async fn find(&self, id: i64) -> RepoResult<Option<Post>> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT id, title, description, author_id, publish_date, image \
                 FROM posts WHERE id = $1",
                &[&id],
            )
            .await
            .map_err(map_pg_error)?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn list(&self) -> RepoResult<Vec<Post>> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT id, title, description, author_id, publish_date, image \
                 FROM posts ORDER BY id",
                &[],
            )
            .await
            .map_err(map_pg_error)?;
        rows.iter().map(post_from_row).collect()
    }

    async fn update(&self, id: i64, changes: PostChanges) -> RepoResult<Option<Post>> {
        let client = self.client().await?;
        let set_image = changes.image.is_some();
        let image = changes.image.flatten();
        let row = client
            .query_opt(
                "UPDATE posts SET \
                    title = COALESCE($2, title), \
                    description = COALESCE($3, description), \
                    image = CASE WHEN $5 THEN $4::VARCHAR ELSE image END, \
                    publish_date = NOW() \
                 WHERE id = $1 \
                 RETURNING id, title, description, author_id, publish_date, image",
                &[&id, &changes.title, &changes.description, &image, &set_image],
            )
            .await
            .map_err(map_pg_error)?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let client = self.client().await?;
        let n = client
            .execute("DELETE FROM posts WHERE id = $1", &[&id])
            .await
            .map_err(map_pg_error)?;
        Ok(n > 0)
    }
}
