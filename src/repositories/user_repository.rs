use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_postgres::Row;

use super::pg::{PgStore, map_pg_error};
use super::RepoResult;
use crate::models::user::{NewUser, User, UserChanges};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> RepoResult<User>;
    async fn find(&self, id: i64) -> RepoResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    async fn list(&self) -> RepoResult<Vec<User>>;
    async fn update(&self, id: i64, changes: UserChanges) -> RepoResult<Option<User>>;
    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> RepoResult<()>;
    /// Removes the account together with its posts, likes and comments.
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

const USER_COLUMNS: &str = "id, username, password_hash, phone, email, first_name, last_name, \
     is_active, is_staff, is_superuser, date_joined, last_login";

fn user_from_row(row: &Row) -> RepoResult<User> {
    Ok(User {
        id: row.try_get("id").map_err(map_pg_error)?,
        username: row.try_get("username").map_err(map_pg_error)?,
        password_hash: row.try_get("password_hash").map_err(map_pg_error)?,
        phone: row.try_get("phone").map_err(map_pg_error)?,
        email: row.try_get("email").map_err(map_pg_error)?,
        first_name: row.try_get("first_name").map_err(map_pg_error)?,
        last_name: row.try_get("last_name").map_err(map_pg_error)?,
        is_active: row.try_get("is_active").map_err(map_pg_error)?,
        is_staff: row.try_get("is_staff").map_err(map_pg_error)?,
        is_superuser: row.try_get("is_superuser").map_err(map_pg_error)?,
        date_joined: row.try_get("date_joined").map_err(map_pg_error)?,
        last_login: row.try_get("last_login").map_err(map_pg_error)?,
    })
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let client = self.client().await?;
        let sql = format!(
            "INSERT INTO users (username, password_hash, phone, email, first_name, last_name) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        );
        let row = client
            .query_one(
                sql.as_str(),
                &[
                    &user.username,
                    &user.password_hash,
                    &user.phone,
                    &user.email,
                    &user.first_name,
                    &user.last_name,
                ],
            )
            .await
            .map_err(map_pg_error)?;
        user_from_row(&row)
    }

    async fn find(&self, id: i64) -> RepoResult<Option<User>> {
        let client = self.client().await?;
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = client
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(map_pg_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let client = self.client().await?;
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let row = client
            .query_opt(sql.as_str(), &[&username])
            .await
            .map_err(map_pg_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list(&self) -> RepoResult<Vec<User>> {
        let client = self.client().await?;
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let rows = client.query(sql.as_str(), &[]).await.map_err(map_pg_error)?;
        rows.iter().map(user_from_row).collect()
    }

    async fn update(&self, id: i64, changes: UserChanges) -> RepoResult<Option<User>> {
        let client = self.client().await?;
        let sql = format!(
            "UPDATE users SET \
                username = COALESCE($2, username), \
                password_hash = COALESCE($3, password_hash), \
                phone = COALESCE($4, phone), \
                email = COALESCE($5, email), \
                first_name = COALESCE($6, first_name), \
                last_name = COALESCE($7, last_name) \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = client
            .query_opt(
                sql.as_str(),
                &[
                    &id,
                    &changes.username,
                    &changes.password_hash,
                    &changes.phone,
                    &changes.email,
                    &changes.first_name,
                    &changes.last_name,
                ],
            )
            .await
            .map_err(map_pg_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> RepoResult<()> {
        let client = self.client().await?;
        client
            .execute("UPDATE users SET last_login = $2 WHERE id = $1", &[&id, &at])
            .await
            .map_err(map_pg_error)?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let client = self.client().await?;
        // posts, likes and comments go with the account via ON DELETE CASCADE
        let n = client
            .execute("DELETE FROM users WHERE id = $1", &[&id])
            .await
            .map_err(map_pg_error)?;
        Ok(n > 0)
    }
}
