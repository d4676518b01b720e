//! User service.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use verdant_common::{AppError, AppResult, IdGenerator};
use verdant_db::entities::user;
use verdant_db::repositories::UserRepository;

/// Input for registering a user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 128))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 256))]
    pub password: String,
    #[validate(length(max = 256))]
    pub display_name: Option<String>,
}

/// Input for logging in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Service for managing users and sessions.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
    /// Session token lifetime in seconds.
    token_max_age: i64,
}

impl UserService {
    /// Create a new user service. `token_max_age` is the session token
    /// lifetime in seconds.
    #[must_use]
    pub const fn new(user_repo: UserRepository, token_max_age: i64) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
            token_max_age,
        }
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Register a new user.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Username '{}' is taken",
                input.username
            )));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))?
            .to_string();

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            display_name: Set(input.display_name),
            email: Set(input.email),
            password_hash: Set(password_hash),
            token: Set(None),
            token_issued_at: Set(None),
            profile_picture: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.user_repo.create(model).await?;

        tracing::info!(user_id = %created.id, "User registered");

        Ok(created)
    }

    /// Log in with email and password, issuing a session token.
    pub async fn login(&self, input: LoginInput) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Internal(format!("Stored hash is invalid: {e}")))?;

        if Argon2::default()
            .verify_password(input.password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(AppError::Unauthorized);
        }

        let token = self.id_gen.generate_token();
        self.user_repo.set_token(&user.id, Some(token)).await
    }

    /// Log out, clearing the session token.
    pub async fn logout(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.set_token(user_id, None).await?;
        Ok(())
    }

    /// Authenticate a request by its bearer token.
    ///
    /// Tokens issued longer than `token_max_age` seconds ago are rejected
    /// as if they did not exist.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let issued_at = user.token_issued_at.ok_or(AppError::Unauthorized)?;
        if Utc::now() - issued_at.with_timezone(&Utc) > Duration::seconds(self.token_max_age) {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Set (or clear) the profile picture of a user.
    pub async fn set_profile_picture(
        &self,
        user_id: &str,
        media_id: Option<String>,
    ) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();
        active.profile_picture = Set(media_id);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = UserService::new(UserRepository::new(db), 604_800);

        let result = svc
            .register(RegisterInput {
                username: "alice".to_string(),
                email: "not-an-email".to_string(),
                password: "correct horse".to_string(),
                display_name: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let existing = user::Model {
            id: "usr1".to_string(),
            username: "alice".to_string(),
            display_name: None,
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            token: None,
            token_issued_at: None,
            profile_picture: None,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let svc = UserService::new(UserRepository::new(db), 604_800);

        let result = svc
            .register(RegisterInput {
                username: "alice".to_string(),
                email: "other@example.com".to_string(),
                password: "correct horse".to_string(),
                display_name: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    fn user_with_token(issued_at: chrono::DateTime<Utc>) -> user::Model {
        user::Model {
            id: "usr1".to_string(),
            username: "alice".to_string(),
            display_name: None,
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            token: Some("tok1".to_string()),
            token_issued_at: Some(issued_at.into()),
            profile_picture: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_authenticate_expired_token_is_unauthorized() {
        let stale = user_with_token(Utc::now() - Duration::days(8));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stale]])
                .into_connection(),
        );
        let svc = UserService::new(UserRepository::new(db), 604_800);

        let result = svc.authenticate_by_token("tok1").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_fresh_token_succeeds() {
        let fresh = user_with_token(Utc::now() - Duration::hours(1));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fresh]])
                .into_connection(),
        );
        let svc = UserService::new(UserRepository::new(db), 604_800);

        let user = svc.authenticate_by_token("tok1").await.unwrap();

        assert_eq!(user.id, "usr1");
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token_is_unauthorized() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let svc = UserService::new(UserRepository::new(db), 604_800);

        let result = svc.authenticate_by_token("bogus").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
