// src/services/auth_services.rs - registration, credential checks and session tokens
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};

use crate::dtos::auth_dtos::{LoginIn, LoginOut, RefreshIn, RefreshOut, RegisterIn};
use crate::error::{AppError, AppResult};
use crate::models::user::{NewUser, UserPublic};
use crate::repositories::UserRepository;
use crate::services::password::{dummy_hash, hash_password, verify_password};
use crate::services::token_services::{TokenError, TokenService};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub async fn register(&self, input: RegisterIn) -> AppResult<UserPublic> {
        input.validate().map_err(AppError::ValidationError)?;

        let password_hash = hash_off_thread(input.password.unwrap_or_default()).await?;
        let user = self
            .users
            .create(NewUser {
                username: input.username.unwrap_or_default(),
                password_hash,
                phone: input.phone.unwrap_or_default(),
                email: input.email.unwrap_or_default(),
                first_name: input.first_name.unwrap_or_default(),
                last_name: input.last_name.unwrap_or_default(),
            })
            .await?;

        info!("registered user {} ({})", user.id, user.username);
        Ok(user.into())
    }

    /// Unknown user, wrong password and inactive account all look the same
    /// to the caller.
    pub async fn login(&self, input: LoginIn) -> AppResult<LoginOut> {
        let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

        let (Some(username), Some(password)) = (input.username, input.password) else {
            return Err(invalid());
        };
        let found = self.users.find_by_username(&username).await?;

        let hash = match &found {
            Some(user) => user.password_hash.clone(),
            None => dummy_hash().to_string(),
        };
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("password check: {}", e)))?;

        let Some(user) = found else {
            warn!("login failed: unknown user {:?}", username);
            return Err(invalid());
        };
        if !matches || !user.is_active {
            warn!("login failed for user {}", user.id);
            return Err(invalid());
        }

        let pair = self.tokens.issue_pair(user.id)?;
        self.users.record_login(user.id, Utc::now()).await?;

        info!("user {} logged in", user.id);
        Ok(LoginOut {
            refresh: pair.refresh,
            access: pair.access,
            user_id: user.id,
            username: user.username,
        })
    }

    /// Blacklists the refresh token. Any token problem is a 400 here.
    pub async fn logout(&self, input: RefreshIn) -> AppResult<()> {
        let token = refresh_field(input)?;
        match self.tokens.revoke(&token).await {
            Ok(claims) => {
                info!("refresh token {} of user {} blacklisted", claims.jti, claims.user_id);
                Ok(())
            }
            Err(TokenError::Repo(e)) => Err(e.into()),
            Err(e) => Err(AppError::BadRequest(e.to_string())),
        }
    }

    /// Mints a new access token; with rotation on, also swaps the refresh token.
    pub async fn refresh(&self, input: RefreshIn) -> AppResult<RefreshOut> {
        let token = refresh_field(input)?;
        let claims = self.tokens.validate_refresh(&token).await?;

        match self.users.find(claims.user_id).await? {
            Some(user) if user.is_active => {}
            _ => return Err(AppError::Unauthorized("User not found".to_string())),
        }

        if self.tokens.rotates_refresh_tokens() {
            self.tokens.revoke_claims(&claims).await?;
            let pair = self.tokens.issue_pair(claims.user_id)?;
            return Ok(RefreshOut {
                access: pair.access,
                refresh: Some(pair.refresh),
            });
        }

        Ok(RefreshOut {
            access: self.tokens.issue_access(claims.user_id)?,
            refresh: None,
        })
    }
}

fn refresh_field(input: RefreshIn) -> AppResult<String> {
    input
        .refresh
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("refresh: This field is required.".to_string()))
}

/// Argon2 is deliberately slow; keep it off the async workers.
pub async fn hash_off_thread(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing: {}", e)))?
        .map_err(AppError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenSettings;
    use crate::repositories::MemoryStore;
    use chrono::Duration;

    fn service(rotate: bool) -> AuthService {
        let store = Arc::new(MemoryStore::new());
        let tokens = TokenService::new(
            &TokenSettings {
                secret: "unit-test-secret".into(),
                access_ttl: Duration::minutes(5),
                refresh_ttl: Duration::days(1),
                rotate_refresh: rotate,
            },
            store.clone(),
        );
        AuthService::new(store, tokens)
    }

    fn register_body(username: &str, phone: &str) -> RegisterIn {
        RegisterIn {
            username: Some(username.into()),
            password: Some("s3cret!".into()),
            phone: Some(phone.into()),
            ..Default::default()
        }
    }

    fn login_body(username: &str, password: &str) -> LoginIn {
        LoginIn {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    #[tokio::test]
    async fn second_registration_with_same_phone_fails() {
        let svc = service(false);
        svc.register(register_body("alice", "0811")).await.unwrap();
        let err = svc.register(register_body("bob", "0811")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let svc = service(false);
        svc.register(register_body("alice", "0811")).await.unwrap();
        let err = svc.login(login_body("alice", "nope")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let svc = service(false);
        svc.register(register_body("alice", "0811")).await.unwrap();
        let err = svc.login(login_body("mallory", "s3cret!")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn logout_then_refresh_is_refused() {
        let svc = service(false);
        svc.register(register_body("alice", "0811")).await.unwrap();
        let session = svc.login(login_body("alice", "s3cret!")).await.unwrap();

        let body = || RefreshIn {
            refresh: Some(session.refresh.clone()),
        };
        assert!(svc.refresh(body()).await.is_ok());
        svc.logout(body()).await.unwrap();

        assert!(matches!(
            svc.refresh(body()).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            svc.logout(body()).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn rotation_retires_the_presented_token() {
        let svc = service(true);
        svc.register(register_body("alice", "0811")).await.unwrap();
        let session = svc.login(login_body("alice", "s3cret!")).await.unwrap();

        let rotated = svc
            .refresh(RefreshIn {
                refresh: Some(session.refresh.clone()),
            })
            .await
            .unwrap();
        let next = rotated.refresh.expect("rotation hands out a new refresh token");

        assert!(
            svc.refresh(RefreshIn {
                refresh: Some(session.refresh)
            })
            .await
            .is_err()
        );
        assert!(svc.refresh(RefreshIn { refresh: Some(next) }).await.is_ok());
    }
}
