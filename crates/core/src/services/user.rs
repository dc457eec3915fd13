//! User service.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use racehub_common::{AppError, AppResult, IdGenerator};
use racehub_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user. The first account on an empty instance is an admin.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let username = input.username.trim();
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(AppError::Validation(
                "Username may only contain letters, digits, '_', '-' and '.'".to_string(),
            ));
        }

        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let is_first_user = self.user_repo.count().await? == 0;
        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username.to_string()),
            username_lower: Set(username.to_lowercase()),
            password_hash: Set(Some(password_hash)),
            token: Set(Some(self.id_gen.generate_token())),
            is_admin: Set(is_first_user),
            is_moderator: Set(false),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;

        tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User registered");

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Authenticate a user by username and password.
    ///
    /// Returns the user with a usable session token.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username.trim())
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::Unauthorized)?;

        let password_hash = user.password_hash.as_deref().ok_or(AppError::Unauthorized)?;
        if !verify_password(password, password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if user.token.is_some() {
            return Ok(user);
        }

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await
    }

    /// Invalidate the user's current session token.
    pub async fn sign_out(&self, user: &user::Model) -> AppResult<()> {
        let mut active: user::ActiveModel = user.clone().into();
        active.token = Set(Some(self.id_gen.generate_token()));
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        tracing::info!(user_id = %user.id, "User signed out");

        Ok(())
    }

    /// Grant or revoke moderator rights. Admins only.
    pub async fn set_moderator(
        &self,
        admin: &user::Model,
        user_id: &str,
        is_moderator: bool,
    ) -> AppResult<user::Model> {
        if !admin.is_admin {
            return Err(AppError::Forbidden(
                "Only admins can change moderator rights".to_string(),
            ));
        }

        let target = self.user_repo.get_by_id(user_id).await?;
        if target.is_moderator == is_moderator {
            return Ok(target);
        }

        let mut active: user::ActiveModel = target.into();
        active.is_moderator = Set(is_moderator);
        active.updated_at = Set(Some(Utc::now().into()));
        let user = self.user_repo.update(active).await?;

        tracing::info!(
            user_id = %user.id,
            admin_id = %admin.id,
            is_moderator,
            "Moderator rights changed"
        );

        Ok(user)
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
