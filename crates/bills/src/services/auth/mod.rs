//! Authentication service.
//!
//! Provides username/password registration and login backed by argon2 hashes.

mod error;

pub use error::AuthError;

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use homebase_core::{Role, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
///
/// Handles user registration and login.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account with the `user` role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch` if `confirm` differs from `password`.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::InvalidUsername` if the username format is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm: &str,
    ) -> Result<User, AuthError> {
        if password != confirm {
            return Err(AuthError::PasswordMismatch);
        }
        self.create_user(username, password, Role::User).await
    }

    /// Create an account with an explicit role (admin panel, CLI, seeding).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::InvalidUsername` if the username format is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        validate_password(password)?;
        let username = Username::parse(username)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&username, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "Account created");
        Ok(user)
    }

    /// Login with username and password.
    ///
    /// Unknown usernames, malformed usernames and wrong passwords all yield
    /// `AuthError::InvalidCredentials`, and unknown users still pay for one
    /// hash verification.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        let Ok(username) = Username::parse(username) else {
            return Err(AuthError::InvalidCredentials);
        };

        let Some((user, password_hash)) = self.users.get_password_hash(&username).await? else {
            if let Some(dummy) = dummy_hash() {
                let _ = verify_password(password, dummy);
            }
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

// =============================================================================
// Password helpers
// =============================================================================

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }

    Ok(())
}

/// Hash verified against when the username does not exist.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("homebase-timing-equalizer").ok())
        .as_deref()
}
